//! Local filters over already-fetched products and fairs

use std::collections::HashSet;

use crate::models::{Fair, Participation, Product, RecordId};

/// Case-insensitive substring match on name or description. A blank query
/// keeps everything.
pub fn search<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return products.iter().collect();
    }
    products
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .map(|description| description.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .collect()
}

/// `None` means every category
pub fn in_category<'a>(products: &'a [Product], category: Option<&RecordId>) -> Vec<&'a Product> {
    products
        .iter()
        .filter(|product| match category {
            Some(category) => product.category.as_ref() == Some(category),
            None => true,
        })
        .collect()
}

/// The general catalog: products not tied to a fair
pub fn outside_fairs(products: &[Product]) -> Vec<&Product> {
    products.iter().filter(|product| product.fair.is_none()).collect()
}

pub fn sorted_by_name(products: &[Product]) -> Vec<&Product> {
    let mut sorted: Vec<&Product> = products.iter().collect();
    sorted.sort_by_cached_key(|product| product.name.to_lowercase());
    sorted
}

/// Fairs the participations point at, in the order of `fairs`
pub fn fairs_joined<'a>(fairs: &'a [Fair], participations: &[Participation]) -> Vec<&'a Fair> {
    let joined: HashSet<&RecordId> = participations.iter().map(|p| &p.fair_id).collect();
    fairs.iter().filter(|fair| joined.contains(&fair.id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, description: Option<&str>, category: Option<&str>, fair: Option<&str>) -> Product {
        Product {
            id: RecordId::from(id),
            owner: None,
            category: category.map(RecordId::from),
            fair: fair.map(RecordId::from),
            name: name.into(),
            price: 1.0,
            description: description.map(String::from),
            location: None,
            photo: None,
            published_at: None,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Silla de madera", None, Some("muebles"), None),
            product(2, "lámpara", Some("Ideal para escritorio"), Some("hogar"), Some("f1")),
            product(3, "Escritorio", Some("Pino"), Some("muebles"), None),
        ]
    }

    fn names(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn search_matches_name_or_description() {
        let products = catalog();
        assert_eq!(names(&search(&products, "ESCRITORIO")), vec!["lámpara", "Escritorio"]);
        assert_eq!(search(&products, "   ").len(), 3);
        assert!(search(&products, "bicicleta").is_empty());
    }

    #[test]
    fn category_and_fair_filters() {
        let products = catalog();
        let muebles = RecordId::from("muebles");
        assert_eq!(in_category(&products, Some(&muebles)).len(), 2);
        assert_eq!(in_category(&products, None).len(), 3);
        assert_eq!(names(&outside_fairs(&products)), vec!["Silla de madera", "Escritorio"]);
    }

    #[test]
    fn sort_ignores_case() {
        let products = catalog();
        assert_eq!(
            names(&sorted_by_name(&products)),
            vec!["Escritorio", "lámpara", "Silla de madera"]
        );
    }

    #[test]
    fn joined_fairs_follow_participations() {
        let fairs = vec![
            Fair {
                id: "1".into(),
                name: "Primavera".into(),
                kind: None,
                start_date: None,
                end_date: None,
                rules: None,
            },
            Fair {
                id: "2".into(),
                name: "Otoño".into(),
                kind: None,
                start_date: None,
                end_date: None,
                rules: None,
            },
        ];
        let participations = vec![Participation {
            id: "p".into(),
            user_id: "u".into(),
            fair_id: "2".into(),
        }];
        let joined = fairs_joined(&fairs, &participations);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].name, "Otoño");
    }
}
