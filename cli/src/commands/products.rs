use anyhow::Result;

use nutriplan_core::catalog::{Product, ProductCatalog};

use super::Service;
use super::helpers::{exit_not_found, nutri_score_label, print_json, print_product_table};

pub(crate) fn cmd_products(
    svc: &mut Service,
    catalog: &dyn ProductCatalog,
    query: &str,
    grade: Option<&str>,
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        exit_not_found("Search query is empty", json);
    }
    svc.search_products(catalog, query)?;

    let products: Vec<&Product> = svc
        .state()
        .products_by_nutri_score(grade.unwrap_or(""))
        .collect();

    if products.is_empty() {
        let message = match grade {
            Some(g) => format!("No Nutri-Score {} products found for '{query}'", g.to_uppercase()),
            None => format!("No products found for '{query}'"),
        };
        exit_not_found(&message, json);
    }
    if json {
        return print_json(&products);
    }

    print_product_table(&products);
    println!("{} products found", products.len());
    Ok(())
}

pub(crate) fn cmd_barcode(
    svc: &mut Service,
    catalog: &dyn ProductCatalog,
    code: &str,
    servings: Option<f64>,
    json: bool,
) -> Result<()> {
    let Some(servings) = servings else {
        let Some(product) = svc.lookup_barcode(catalog, code)? else {
            exit_not_found(&format!("No product found for barcode '{code}'"), json);
        };
        if json {
            return print_json(&product);
        }
        print_product_table(&[&product]);
        println!("Nutri-Score: {}", nutri_score_label(&product));
        return Ok(());
    };

    let Some(entry) = svc.log_product_by_barcode(catalog, code, servings)? else {
        exit_not_found(&format!("No product found for barcode '{code}'"), json);
    };

    if json {
        return print_json(&entry);
    }
    let name = &entry.name;
    let cal = entry.calories;
    let ts = entry.timestamp;
    println!("Logged: {name} x{servings} ({cal:.0} kcal) [{ts}]");
    Ok(())
}
