use anyhow::Context;
use clap::Args;

use pantry_core::ProductId;
use pantry_infra::{PantrySession, RemoteStore};
use pantry_inventory::{Catalog, Product, ProductFilter, UpdateProduct};

use super::session::{resolve_category, resolve_location};

#[derive(Debug, Args)]
pub(crate) struct ListProductsArgs {
    /// Case-insensitive name match, or part of the barcode
    #[arg(long, default_value = "")]
    search: String,

    /// Category name or id
    #[arg(long)]
    category: Option<String>,

    /// Only products with a lot at this location (name or id)
    #[arg(long)]
    location: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ProductArg {
    /// Product id
    product: ProductId,
}

#[derive(Debug, Args)]
pub(crate) struct UpdateProductArgs {
    /// Product id
    product: ProductId,

    #[arg(long)]
    name: Option<String>,

    /// New barcode; pass an empty string to clear it
    #[arg(long)]
    ean: Option<String>,

    /// Category name or id
    #[arg(long, conflicts_with = "no_category")]
    category: Option<String>,

    /// Remove the product's category
    #[arg(long)]
    no_category: bool,
}

pub(crate) fn list<S: RemoteStore>(
    session: &PantrySession<S>,
    args: ListProductsArgs,
) -> anyhow::Result<()> {
    let ledger = session.ledger();
    let filter = ProductFilter {
        search: args.search,
        category_id: args
            .category
            .map(|c| resolve_category(ledger, &c))
            .transpose()?,
        location_id: args
            .location
            .map(|l| resolve_location(ledger, &l))
            .transpose()?,
    };

    let products = session.filter_products(&filter);
    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }
    for product in products {
        println!("{}", summary_line(product, ledger.catalog()));
    }
    Ok(())
}

pub(crate) fn show<S: RemoteStore>(
    session: &PantrySession<S>,
    args: ProductArg,
) -> anyhow::Result<()> {
    let product = session.product_details(args.product)?;
    let catalog = session.ledger().catalog();

    println!("{}", summary_line(product, catalog));
    for lot in product.lots() {
        let location = lot
            .location_id
            .and_then(|id| catalog.location(id))
            .map_or_else(|| "-".to_string(), |l| format!("{} {}", l.icon, l.name));
        let expiry = lot
            .expiry
            .map_or_else(|| "no expiry".to_string(), |d| d.to_string());
        println!("  {}  {location}  x{}  {expiry}", lot.id, lot.quantity);
    }
    Ok(())
}

pub(crate) async fn consolidate<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: ProductArg,
) -> anyhow::Result<()> {
    let folded = session
        .consolidate(args.product)
        .await
        .context("failed to consolidate lots")?;
    println!("merged {folded} duplicate lot(s)");
    Ok(())
}

pub(crate) async fn update<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: UpdateProductArgs,
) -> anyhow::Result<()> {
    let ledger = session.ledger();
    let current = session.product_details(args.product)?;

    let category_id = match (args.category, args.no_category) {
        (_, true) => None,
        (Some(category), false) => Some(resolve_category(ledger, &category)?),
        (None, false) => current.category_id(),
    };
    let cmd = UpdateProduct {
        product_id: args.product,
        name: args.name.unwrap_or_else(|| current.name().to_string()),
        ean: args.ean.or_else(|| current.ean().map(str::to_string)),
        category_id,
    };

    session
        .update_product(cmd)
        .await
        .context("failed to update product")?;
    println!("updated product {}", args.product);
    Ok(())
}

pub(crate) async fn delete<S: RemoteStore>(
    session: &mut PantrySession<S>,
    args: ProductArg,
) -> anyhow::Result<()> {
    session
        .delete_product(args.product)
        .await
        .context("failed to delete product")?;
    println!("deleted product {}", args.product);
    Ok(())
}

fn summary_line(product: &Product, catalog: &Catalog) -> String {
    let category = product
        .category_id()
        .and_then(|id| catalog.category(id))
        .map_or("uncategorised", |c| c.name.as_str());
    let ean = product
        .ean()
        .map(|e| format!(" [{e}]"))
        .unwrap_or_default();
    format!(
        "{}  {}{ean}  ({category})  total {} in {} lot(s)",
        product.id_typed(),
        product.name(),
        product.total_quantity(),
        product.lots().len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::CategoryId;
    use pantry_inventory::Category;

    #[test]
    fn summary_line_falls_back_for_missing_category() {
        let dairy = CategoryId::new();
        let catalog = Catalog::new(
            vec![Category {
                id: dairy,
                name: "Dairy".to_string(),
            }],
            vec![],
        );

        let product = Product::new(ProductId::new(), "Milk", Some("8001".to_string()), Some(dairy));
        let line = summary_line(&product, &catalog);
        assert!(line.contains("Milk [8001]  (Dairy)  total 0 in 0 lot(s)"));

        let orphan = Product::new(ProductId::new(), "Tea", None, Some(CategoryId::new()));
        assert!(summary_line(&orphan, &catalog).contains("Tea  (uncategorised)"));
    }
}
