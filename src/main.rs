// Shopping List - desktop app shell.
//
// UI glue only: renders the list and forwards actions to the database
// manager. All persistence behavior lives in the library.

use anyhow::Context;

use shopping_list::storage::config::ConfigService;
use shopping_list::storage::database::DatabaseManager;
use shopping_list::storage::shared_cache::SharedCacheStore;
use shopping_list::Item;

fn main() -> anyhow::Result<()> {
    let config = ConfigService::new().context("loading configuration")?;
    let settings = config.get_config_clone();

    let mut manager = DatabaseManager::new(settings.store_configuration());
    if settings.mirror_to_shared_cache {
        let cache = SharedCacheStore::new().context("opening shared cache")?;
        manager = manager.with_shared_cache_mirror(cache);
    }
    manager
        .set_up_connection(settings.prepopulate_store)
        .context("setting up database")?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("add") => {
            let name = args
                .next()
                .context("usage: shopping-list add <name>")?
                .to_lowercase();
            manager.save(&Item::new(name, false), true)?;
        }
        Some("buy") => {
            let name = args
                .next()
                .context("usage: shopping-list buy <name>")?
                .to_lowercase();
            manager.purchase_item(&name);
        }
        Some("clear") => manager.clear_database()?,
        Some("list") | None => {}
        Some(other) => {
            anyhow::bail!("unknown command {:?}; expected add, buy, clear, or list", other)
        }
    }

    render_list(&manager.shopping_cart()?);
    Ok(())
}

fn render_list(items: &[Item]) {
    if items.is_empty() {
        println!("(shopping list is empty)");
        return;
    }
    for item in items {
        let mark = if item.purchased { "x" } else { " " };
        println!("[{}] {}", mark, item.name.as_deref().unwrap_or("?"));
    }
}
