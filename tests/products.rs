use copse::{Map, Set, StringMap};

#[derive(Debug, Clone, PartialEq)]
struct Product {
    name: &'static str,
    price: u32,
}

fn product(name: &'static str, price: u32) -> Product {
    Product { name, price }
}

fn ids(map: &Map<u32, Product>) -> Vec<u32> {
    map.iter().map(|(id, _)| *id).collect()
}

#[test]
fn catalogue_insert_and_remove() {
    let mut catalogue = Map::new();

    catalogue.insert(101, product("Laptop", 700_000));
    catalogue.insert(102, product("Table", 120_000));
    catalogue.insert(100, product("Chair", 50_000));
    catalogue.insert(103, product("Bookshelf", 250_000));

    assert_eq!(ids(&catalogue), vec![100, 101, 102, 103]);
    assert_eq!(catalogue.height(), 3);

    let removed = catalogue.remove(&102);
    assert_eq!(removed.map(|p| p.name), Some("Table"));

    assert_eq!(ids(&catalogue), vec![100, 101, 103]);
    assert_eq!(catalogue.height(), 2);
    assert_eq!(catalogue.get(&102), None);
    assert_eq!(catalogue.get(&103).map(|p| p.name), Some("Bookshelf"));
}

#[test]
fn catalogue_sorted_arrivals_stay_shallow() {
    let mut catalogue = Map::new();
    for id in 1..=7 {
        catalogue.insert(id, product("Clay Pot", 15_000));
    }

    assert_eq!(catalogue.height(), 3);

    let catalogue: Map<u32, ()> = (0..1023).map(|id| (id, ())).collect();
    assert_eq!(catalogue.height(), 10);
}

#[test]
fn catalogue_duplicate_and_absent_are_noops() {
    let mut catalogue = Map::new();
    assert!(catalogue.insert(7, product("Necklace", 50_000)));
    assert!(!catalogue.insert(7, product("Ring", 10_000)));
    assert_eq!(catalogue.get(&7).map(|p| p.name), Some("Necklace"));

    let before: Vec<(u32, Product)> = catalogue.iter().map(|(k, v)| (*k, v.clone())).collect();
    assert_eq!(catalogue.remove(&8), None);
    let after: Vec<(u32, Product)> = catalogue.iter().map(|(k, v)| (*k, v.clone())).collect();
    assert_eq!(before, after);

    if let Some(p) = catalogue.get_mut(&7) {
        p.price = 45_000;
    }
    assert_eq!(catalogue.get(&7).map(|p| p.price), Some(45_000));
}

#[test]
fn traversal_is_restartable() {
    let catalogue: Map<u32, u32> = [(3, 30), (1, 10), (2, 20)].into_iter().collect();

    let first: Vec<u32> = catalogue.iter().map(|(k, _)| *k).collect();
    let second: Vec<u32> = (&catalogue).into_iter().map(|(k, _)| *k).collect();
    assert_eq!(first, second);
    assert_eq!(catalogue.iter().len(), 3);
}

#[test]
fn categories_by_name() {
    let mut categories: StringMap<Vec<Product>> = StringMap::new();
    for name in ["Electronics", "Furniture", "Clothing"] {
        categories.insert(name, Vec::new());
    }

    if let Some(products) = categories.get_mut("Electronics") {
        products.push(product("Laptop", 700_000));
        products.push(product("Phone", 300_000));
    }
    if let Some(products) = categories.get_mut("Furniture") {
        products.push(product("Sofa", 400_000));
    }

    let names: Vec<&str> = categories.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["Clothing", "Electronics", "Furniture"]);
    assert_eq!(categories.get("Electronics").map(Vec::len), Some(2));
    assert!(categories.get("Toys").is_none());
}

#[test]
fn set_of_order_ids() {
    let mut orders: Set<u64> = [5, 3, 8, 1].into_iter().collect();

    assert!(orders.contains(&3));
    assert!(orders.remove(&3));
    assert!(!orders.remove(&3));
    assert_eq!(orders.pop_first(), Some(1));
    assert_eq!(orders.pop_last(), Some(8));
    assert_eq!(orders.iter().copied().collect::<Vec<_>>(), vec![5]);
}
