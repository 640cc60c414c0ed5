//! Item operations on a zombie's embedded `items` sequence.
//!
//! Items are addressed by the owning zombie's name plus the item name.
//! Writes return the parent zombie as it is after the write, or `None`
//! when no zombie has that name.

use horde_core::ServiceError;
use horde_docstore::{Filter, Update};
use tracing::{info, warn};

use crate::model::{DeleteOutcome, DeleteTarget, Item, Zombie, ZombieItems};
use crate::store::{ZombieStore, by_name, decode, to_json};

const ITEMS: &str = "items";

fn item_named(name: &str) -> Filter {
    Filter::new().eq("name", name)
}

impl ZombieStore {
    /// The `items` of the zombie called `name`, projected with its `_id`.
    pub fn find_items(&self, name: &str) -> Result<Option<ZombieItems>, ServiceError> {
        self.zombies
            .find_one_projected(&by_name(name), &[ITEMS])?
            .map(decode)
            .transpose()
    }

    /// Append `item` to the zombie called `name`. Duplicate item names are
    /// allowed.
    pub fn create_item(&self, name: &str, item: Item) -> Result<Option<Zombie>, ServiceError> {
        let update = Update::push(ITEMS, to_json(&item)?);
        let Some(updated) = self.zombies.find_one_and_update(&by_name(name), &[update])? else {
            return Ok(None);
        };
        info!(zombie = %name, item = %item.name, "item added");
        decode(updated.document).map(Some)
    }

    /// Replace the first item whose name equals `item.name`, keeping its
    /// position. Without a matching item the zombie comes back unchanged.
    pub fn update_item(&self, name: &str, item: Item) -> Result<Option<Zombie>, ServiceError> {
        let update = Update::replace_first(ITEMS, item_named(&item.name), to_json(&item)?);
        let Some(updated) = self.zombies.find_one_and_update(&by_name(name), &[update])? else {
            return Ok(None);
        };
        if updated.modified {
            info!(zombie = %name, item = %item.name, "item updated");
        }
        decode(updated.document).map(Some)
    }

    /// Remove the first item called `item_name` from the zombie called
    /// `name`. The zombie itself is never removed.
    pub fn delete_item(&self, name: &str, item_name: &str) -> DeleteOutcome {
        let update = Update::remove_first(ITEMS, item_named(item_name));
        match self.zombies.find_one_and_update(&by_name(name), &[update]) {
            Ok(updated) => {
                let matched = updated.is_some_and(|u| u.modified);
                info!(zombie = %name, item = %item_name, matched, "item deleted");
                DeleteOutcome::done(DeleteTarget::Item, matched)
            }
            Err(e) => {
                warn!(zombie = %name, item = %item_name, error = %e, "item could not be deleted");
                DeleteOutcome::failed(DeleteTarget::Item, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Item, NewZombie};
    use crate::store::tests::{hammer, test_store};

    fn item(name: &str, price: f64) -> Item {
        Item {
            name: name.into(),
            price,
        }
    }

    fn item_names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn find_items_projects_id_and_items() {
        let store = test_store();
        let zombie = store
            .create(NewZombie::named("Zombie1").with_items(vec![hammer()]))
            .unwrap();

        let found = store.find_items("Zombie1").unwrap().unwrap();
        assert_eq!(found.id, zombie.id);
        assert_eq!(found.items, vec![hammer()]);
        assert!(store.find_items("Nobody").unwrap().is_none());
    }

    #[test]
    fn create_item_appends_in_order() {
        let store = test_store();
        store.create(NewZombie::named("Zombie2")).unwrap();

        store.create_item("Zombie2", item("Iron Maiden", 666.0)).unwrap();
        let zombie = store
            .create_item("Zombie2", item("Deep Purple", 100.0))
            .unwrap()
            .unwrap();
        assert_eq!(item_names(&zombie.items), vec!["Iron Maiden", "Deep Purple"]);
        assert!(zombie.updated_at.is_some());

        assert!(store.create_item("Nobody", hammer()).unwrap().is_none());
    }

    #[test]
    fn appended_item_is_last_in_find_items() {
        let store = test_store();
        let created = store
            .create(NewZombie::named("Zombie1").with_items(vec![hammer()]))
            .unwrap();

        let axe = item("Rusty Axe", 12.5);
        store.create_item("Zombie1", axe.clone()).unwrap().unwrap();

        let listed = store.find_items("Zombie1").unwrap().unwrap();
        assert_eq!(listed.id, created.id);
        assert_eq!(listed.items.len(), 2);
        assert_eq!(listed.items.last(), Some(&axe));
    }

    #[test]
    fn create_item_allows_duplicate_names() {
        let store = test_store();
        store
            .create(NewZombie::named("Zombie1").with_items(vec![hammer()]))
            .unwrap();
        let zombie = store.create_item("Zombie1", hammer()).unwrap().unwrap();
        assert_eq!(zombie.items.len(), 2);
    }

    #[test]
    fn update_item_replaces_first_match_in_place() {
        let store = test_store();
        store
            .create(NewZombie::named("Zombie2").with_items(vec![
                item("Iron Maiden", 666.0),
                item("Deep Purple", 100.0),
                item("Deep Purple", 1.0),
            ]))
            .unwrap();

        let zombie = store
            .update_item("Zombie2", item("Deep Purple", 222.0))
            .unwrap()
            .unwrap();
        assert_eq!(
            zombie.items,
            vec![
                item("Iron Maiden", 666.0),
                item("Deep Purple", 222.0),
                item("Deep Purple", 1.0),
            ]
        );
    }

    #[test]
    fn update_item_without_match_leaves_zombie_unchanged() {
        let store = test_store();
        let created = store
            .create(NewZombie::named("Zombie1").with_items(vec![hammer()]))
            .unwrap();

        let zombie = store
            .update_item("Zombie1", item("Nobody", 1.0))
            .unwrap()
            .unwrap();
        assert_eq!(zombie, created);
        assert!(store.update_item("Nobody", hammer()).unwrap().is_none());
    }

    #[test]
    fn delete_item_removes_only_the_item() {
        let store = test_store();
        store
            .create(NewZombie::named("Zombie2").with_items(vec![
                item("Iron Maiden", 666.0),
                item("Deep Purple", 100.0),
            ]))
            .unwrap();

        let outcome = store.delete_item("Zombie2", "Iron Maiden");
        assert!(outcome.success && outcome.matched);
        assert_eq!(outcome.status(), "The zombie item has been deleted");

        let zombie = store.find_by_name("Zombie2").unwrap().unwrap();
        assert_eq!(item_names(&zombie.items), vec!["Deep Purple"]);
    }

    #[test]
    fn delete_missing_item_is_not_an_error() {
        let store = test_store();
        store.create(NewZombie::named("Zombie1")).unwrap();

        let outcome = store.delete_item("Zombie1", "Nobody");
        assert!(outcome.success && !outcome.matched);
        let outcome = store.delete_item("Nobody", "Nobody");
        assert!(outcome.success && !outcome.matched);
        assert!(store.find_by_name("Zombie1").unwrap().is_some());
    }
}
