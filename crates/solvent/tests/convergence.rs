//! Integration tests verifying replica convergence and the end-to-end
//! list scenarios.
//!
//! For any entity, merging replicas in any order must produce the same result.

use solvent::prelude::*;
use solvent::Error;

fn groceries() -> (ToDoList, [uuid::Uuid; 3]) {
    let mut list = ToDoList::new("Groceries").unwrap();
    let ids = [
        list.add_item("Milk").unwrap(),
        list.add_item("Eggs").unwrap(),
        list.add_item("Bread").unwrap(),
    ];
    (list, ids)
}

#[test]
fn new_list_with_three_unchecked_items() {
    let (list, _) = groceries();
    let items = list.get_items();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| !item.checked));
}

#[test]
fn removed_item_is_gone() {
    let mut list = ToDoList::new("Groceries").unwrap();
    let milk = list.add_item("Milk").unwrap();
    list.remove_item(milk);

    assert!(matches!(list.get_item(milk), Err(Error::NotFound { .. })));
    assert!(list.get_items().is_empty());
}

#[test]
fn check_then_uncheck_reissues_id() {
    let mut list = ToDoList::new("Groceries").unwrap();
    let x = list.add_item("Milk").unwrap();

    assert_eq!(list.check_item(x).unwrap(), x);
    assert!(list.get_item(x).unwrap().checked);

    let y = list.uncheck_item(x).unwrap();
    assert_ne!(x, y);
    assert!(list.get_item(x).unwrap_err().is_not_found());

    let fresh = list.get_item(y).unwrap();
    assert!(!fresh.checked);
    assert_eq!(fresh.title, "Milk");
}

#[test]
fn rename_and_add_on_different_replicas() {
    let mut a = ToDoList::new("Groceries").unwrap();
    let mut b = a.clone();

    let tea = a.add_item("Tea").unwrap();
    let later = a.title().updated_at + 1_000;
    b.rename_with_timestamp("Shopping", later);

    let merged = a.merge(&b).unwrap();
    assert_eq!(merged.title().value, "Shopping");
    assert_eq!(merged.get_item(tea).unwrap().title, "Tea");
    assert_eq!(merged, b.merge(&a).unwrap());
}

#[test]
fn move_last_item_between_first_two() {
    let (mut list, [i1, i2, i3]) = groceries();

    list.move_item(i3, 1).unwrap();
    assert_eq!(list.get_item(i3).unwrap().order_value.value, 15.0);

    let order: Vec<_> = list.sorted_items().iter().map(|item| item.id).collect();
    assert_eq!(order, vec![i1, i3, i2]);
}

#[test]
fn notebooks_with_different_ids_do_not_merge() {
    let a = Notebook::new().unwrap();
    let b = Notebook::new().unwrap();
    assert!(matches!(a.merge(&b), Err(Error::CannotBeMerged { .. })));
}

#[test]
fn remove_is_not_undone_by_stale_replica() {
    let (list, [milk, ..]) = groceries();
    let stale = list.clone();

    let mut fresh = list.clone();
    fresh.remove_item(milk);

    // The stale replica keeps editing the item it still believes is live.
    let mut stale = stale;
    stale.check_item(milk).unwrap();
    stale.move_item(milk, 2).unwrap();

    for merged in [fresh.merge(&stale).unwrap(), stale.merge(&fresh).unwrap()] {
        assert!(merged.get_item(milk).unwrap_err().is_not_found());
        assert_eq!(merged.get_items().len(), 2);
    }
}

#[test]
fn concurrent_check_and_move_combine() {
    let (list, [milk, eggs, _]) = groceries();
    let mut a = list.clone();
    let mut b = list.clone();

    a.check_item(milk).unwrap();
    b.move_item(milk, 1).unwrap();

    let merged = a.merge(&b).unwrap();
    let item = merged.get_item(milk).unwrap();
    assert!(item.checked);
    assert_eq!(item.order_value.value, 25.0);

    let order: Vec<_> = merged.sorted_items().iter().map(|i| i.id).collect();
    assert_eq!(order[0], eggs);
}

#[test]
fn notebook_three_way_convergence() {
    let mut base = Notebook::new().unwrap();
    let shared = base.add_list("Shared").unwrap().id();

    let mut a = base.clone();
    let mut b = base.clone();
    let mut c = base.clone();

    a.add_list("Alice").unwrap();
    a.get_list_mut(shared).unwrap().add_item("from a").unwrap();

    let removed = b.add_list("Bob (temporary)").unwrap().id();
    b.remove_list(removed);
    b.get_list_mut(shared).unwrap().add_item("from b").unwrap();

    let chores = c.get_list_mut(shared).unwrap();
    let item = chores.add_item("from c").unwrap();
    chores.check_item(item).unwrap();

    // Merge in different orders
    let order1 = a.merge(&b).unwrap().merge(&c).unwrap();
    let order2 = c.merge(&a).unwrap().merge(&b).unwrap();
    let order3 = b.merge(&c).unwrap().merge(&a).unwrap();
    let grouped = a.merge(&b.merge(&c).unwrap()).unwrap();

    assert_eq!(order1, order2);
    assert_eq!(order2, order3);
    assert_eq!(order1, grouped);

    assert_eq!(order1.get_lists().len(), 2);
    assert!(order1.get_list(removed).is_err());
    assert_eq!(order1.get_list(shared).unwrap().get_items().len(), 3);
    assert!(order1.get_list(shared).unwrap().get_item(item).unwrap().checked);
}

#[test]
fn merge_is_idempotent_at_every_level() {
    let mut notebook = Notebook::new().unwrap();
    let list = notebook.add_list("Groceries").unwrap();
    let milk = list.add_item("Milk").unwrap();
    list.check_item(milk).unwrap();
    let list = list.clone();

    assert_eq!(notebook.merge(&notebook).unwrap(), notebook);
    assert_eq!(list.merge(&list).unwrap(), list);
    let item = list.get_item(milk).unwrap();
    assert_eq!(&item.merge(item).unwrap(), item);
}

#[test]
fn repeated_sync_reaches_fixpoint() {
    let (mut a, [milk, eggs, bread]) = groceries();
    let mut b = a.clone();

    a.move_item(bread, 0).unwrap();
    a.check_item(eggs).unwrap();
    b.remove_item(milk);
    b.add_item("Butter").unwrap();

    let ab = a.merge(&b).unwrap();
    let ba = b.merge(&a).unwrap();
    assert_eq!(ab, ba);

    // Syncing again changes nothing.
    assert_eq!(ab.merge(&a).unwrap(), ab);
    assert_eq!(ab.merge(&b).unwrap(), ab);
}
