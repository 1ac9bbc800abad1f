//! Command execution.

use ptax_fx::{ConvertOptions, PtaxEngine, PtaxResult};
use serde_json::{json, Value};

use crate::cli::{Cli, Command};

/// Run the selected command and return its JSON output.
pub async fn run(cli: &Cli, engine: &PtaxEngine) -> PtaxResult<Value> {
    let options = cli.resolve_options(engine.default_options());

    let output = match &cli.command {
        Command::Rates(args) => {
            let start = match args.date {
                Some(date) => date,
                None => engine.today(),
            };
            let resolved = engine.resolve(start, &options).await?;
            json!({
                "requested": start,
                "date": resolved.date,
                "rates": resolved.rates,
            })
        }
        Command::Rate(args) => json!(engine.get_rate(&args.currency, &options).await?),
        Command::Currencies => json!(engine.supported_currencies(&options).await?),
        Command::Convert(args) => {
            let convert_options = ConvertOptions::from(options).with_rate_kind(args.rate_kind);
            json!(
                engine
                    .convert(args.amount, &args.from, &args.to, &convert_options)
                    .await?
            )
        }
    };

    Ok(output)
}
