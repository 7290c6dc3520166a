//! Crops command - list the supported crops.

use anyhow::Result;
use clap::Args;
use leafcheck_core::{Crop, Language, CROPS};
use serde::Serialize;

/// Arguments for the crops command.
#[derive(Args, Clone)]
pub struct CropsArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,

    /// Language for display names: en or bn
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
}

#[derive(Serialize)]
struct CropEntry<'a> {
    id: &'a str,
    name: &'a str,
    auto_detect: bool,
}

impl<'a> CropEntry<'a> {
    fn new(crop: &'a Crop, language: Language) -> Self {
        Self {
            id: crop.id,
            name: crop.display_name(language),
            auto_detect: crop.is_auto_detect(),
        }
    }
}

/// Run the crops command.
pub fn run(args: &CropsArgs) -> Result<()> {
    print!("{}", render(args)?);
    Ok(())
}

fn render(args: &CropsArgs) -> Result<String> {
    let language = args.lang.unwrap_or_default();
    let entries: Vec<_> = CROPS.iter().map(|c| CropEntry::new(c, language)).collect();

    if args.json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&entries)?));
    }

    let width = entries.iter().map(|e| e.id.len()).max().unwrap_or(0);
    Ok(entries
        .iter()
        .map(|e| format!("{:width$}  {}\n", e.id, e.name))
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_lists_every_crop() {
        let text = render(&CropsArgs {
            json: false,
            lang: None,
        })
        .unwrap();
        assert_eq!(text.lines().count(), CROPS.len());
        assert!(text.starts_with("rice     Rice\n"));
    }

    #[test]
    fn test_json_in_bangla() {
        let text = render(&CropsArgs {
            json: true,
            lang: Some(Language::Bn),
        })
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["id"], "rice");
        assert_eq!(parsed[0]["name"], "ধান");
        assert_eq!(parsed[13]["auto_detect"], true);
    }
}
