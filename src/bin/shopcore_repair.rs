//! shopcore-repair: finish interrupted checkouts
//!
//! A checkout that failed after its order was appended leaves the order in
//! `opened` or `items_copied`. This tool drives such orders to `placed`.
//!
//! ## Usage
//! ```text
//! shopcore-repair [--config <path>] <user-id> [<order-id>]
//! ```
//! With an order id, resumes that order. Without one, resumes every pending
//! order of the user. Each placed order's price is checked against the sum
//! of its line items as computed by the store.
//!
//! ## Configuration
//! - SHOPCORE_CONFIG: Path to a YAML config file
//! - SHOPCORE__STORAGE__TYPE: `memory` or `mongodb`
//! - SHOPCORE_LOG: Log filter (default: info)

use tracing::{error, info, warn};

use shopcore::config::Config;
use shopcore::model::{OrderId, UserId};
use shopcore::utils::bootstrap::{init_tracing, parse_config_path};
use shopcore::validation::parse_id;
use shopcore::Storefront;

const USAGE: &str = "usage: shopcore-repair [--config <path>] <user-id> [<order-id>]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let (config_path, args) = parse_config_path(std::env::args().skip(1));
    let (user_arg, order_arg) = match args.as_slice() {
        [user] => (user.as_str(), None),
        [user, order] => (user.as_str(), Some(order.as_str())),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };
    let user_id: UserId = parse_id(user_arg)?;
    let order_id: Option<OrderId> = order_arg.map(parse_id::<OrderId>).transpose()?;

    let config = Config::load(config_path.as_deref())?;
    let shop = Storefront::from_config(&config).await?;

    let pending_users = shop.users_with_pending_orders().await?;
    info!(pending_users, "Users with unplaced orders");

    let targets = match order_id {
        Some(order_id) => vec![order_id],
        None => shop
            .checkout()
            .pending(user_id)
            .await?
            .into_iter()
            .map(|order| order.order_id)
            .collect(),
    };

    if targets.is_empty() {
        info!(user_id = %user_id, "Nothing to repair");
        return Ok(());
    }

    let mut failed = 0usize;
    for order_id in targets {
        match shop.checkout().resume(user_id, order_id).await {
            Ok(order) => {
                info!(
                    order_id = %order.order_id,
                    price = order.price,
                    items = order.line_items.len(),
                    "Order placed"
                );
                let stored = shop.pricing().order_total(user_id, order.order_id).await?;
                if stored != order.price {
                    warn!(
                        order_id = %order.order_id,
                        price = order.price,
                        stored,
                        "Order price disagrees with its line items"
                    );
                }
            }
            Err(e) => {
                failed += 1;
                error!(order_id = %order_id, code = e.code(), error = %e, "Repair failed");
            }
        }
    }

    if failed > 0 {
        warn!(failed, "Some orders could not be repaired");
        std::process::exit(1);
    }
    Ok(())
}
