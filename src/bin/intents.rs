// Shopping List - voice-assistant extension process.
//
// A short-lived invocation cannot afford to open the full object graph
// store, so the extension talks to the shared cache slot only. Spoken
// phrases are lowercase-normalized before they become item keys.

use anyhow::Context;

use shopping_list::storage::shared_cache::SharedCacheStore;
use shopping_list::Item;

fn main() -> anyhow::Result<()> {
    let mut cache = SharedCacheStore::new().context("opening shared cache")?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("add") => {
            let phrase = args
                .next()
                .context("usage: shopping-list-intents add <phrase>")?;
            cache.add(Item::new(phrase.to_lowercase(), false))?;
            println!("added {}", phrase.to_lowercase());
        }
        Some("complete") => {
            let phrase = args
                .next()
                .context("usage: shopping-list-intents complete <phrase>")?;
            cache.purchase_item(&phrase.to_lowercase())?;
        }
        Some("resolve") => {
            let phrase = args
                .next()
                .context("usage: shopping-list-intents resolve <phrase>")?;
            match cache.fetch_item(&phrase.to_lowercase()) {
                Some(item) => println!(
                    "{} ({})",
                    item.name.as_deref().unwrap_or("?"),
                    if item.purchased { "purchased" } else { "pending" }
                ),
                None => println!("no such item"),
            }
        }
        _ => {
            for item in cache.shopping_cart() {
                let mark = if item.purchased { "x" } else { " " };
                println!("[{}] {}", mark, item.name.as_deref().unwrap_or("?"));
            }
        }
    }
    Ok(())
}
