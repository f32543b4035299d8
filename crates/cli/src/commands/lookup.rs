//! Classification and pricing lookups

use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use advisor_lib::models::OsType;
use advisor_lib::pricing::PricingResolver;
use advisor_lib::series::{ClassificationStatus, SeriesRegistry};

use crate::backends::HttpPricingBackend;
use crate::config::CliConfig;
use crate::output::{format_currency, print_info, print_success, print_warning, OutputFormat};

/// Classify a machine profile series
pub fn classify(profile_id: &str, format: OutputFormat) -> Result<()> {
    let registry = SeriesRegistry::builtin();
    let classification = registry.classify(profile_id);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&classification)?);
        }
        OutputFormat::Table => {
            println!("Profile: {}", profile_id.bold());
            match classification.status {
                ClassificationStatus::None => {
                    print_success("No lifecycle concern on record");
                }
                ClassificationStatus::Retired => {
                    print_warning(&format!("Series retired: {}", classification.reason));
                }
                ClassificationStatus::Announced => {
                    print_warning(&format!(
                        "Retirement announced: {}",
                        classification.reason
                    ));
                }
                ClassificationStatus::PreviousGen => {
                    print_info(&format!("Previous generation: {}", classification.reason));
                }
            }
            if let Some(date) = classification.retirement_date {
                println!("Retirement date: {}", date);
            }
            if !classification.replacement_series.is_empty() {
                println!(
                    "Replacements: {}",
                    classification.replacement_series.join(", ")
                );
            }
        }
    }

    Ok(())
}

/// Look up one pricing quote
pub async fn price(
    config: &CliConfig,
    profile_id: &str,
    region: &str,
    os_type: OsType,
    format: OutputFormat,
) -> Result<()> {
    let backend = Arc::new(HttpPricingBackend::new(&config.pricing_endpoint)?);
    let resolver = PricingResolver::new(backend);
    let quote = resolver.get_price(profile_id, region, os_type).await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        OutputFormat::Table => {
            println!("{} ({}) in {}", profile_id.bold(), os_type, region);
            if quote.found {
                println!(
                    "Hourly:  {}",
                    format_currency(quote.hourly_rate, &quote.currency)
                );
                println!(
                    "Monthly: {}",
                    format_currency(quote.monthly_rate, &quote.currency)
                );
            } else {
                print_warning("No price found; the rate is unknown");
            }
        }
    }

    Ok(())
}
