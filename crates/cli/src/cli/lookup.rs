use clap::Args;

use pantry_infra::{BarcodeLookup, ClientConfig, LookupOutcome};

#[derive(Debug, Args)]
pub(crate) struct LookupArgs {
    /// EAN barcode
    ean: String,
}

pub(crate) async fn run(config: &ClientConfig, args: LookupArgs) -> anyhow::Result<()> {
    let client = config.barcode_client()?;

    match client.lookup(&args.ean).await? {
        LookupOutcome::Found(name) => println!("found: {name}"),
        LookupOutcome::FoundWithoutName => {
            println!("product found without a name; enter it manually")
        }
        LookupOutcome::NotFound => println!("not found in Open Food Facts; enter the name manually"),
    }
    Ok(())
}
