use std::io::IsTerminal;
use std::time::Duration;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value as Json;
use wirebridge::codec::{FieldType, SchemaDocument};

const CALL_RESULT_SCHEMA: &str = "https://schemas.3leaps.dev/wirebridge/cli/v1/call-result.schema.json";
const TYPE_SCHEMA: &str = "https://schemas.3leaps.dev/wirebridge/cli/v1/type-registry.schema.json";

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct CallOutput<'a> {
    schema_id: &'a str,
    channel: &'a str,
    method: &'a str,
    result: &'a Json,
    elapsed_ms: u128,
}

pub fn print_call_result(
    channel: &str,
    method: &str,
    result: &Json,
    elapsed: Duration,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = CallOutput {
                schema_id: CALL_RESULT_SCHEMA,
                channel,
                method,
                result,
                elapsed_ms: elapsed.as_millis(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "METHOD", "ELAPSED", "RESULT"])
                .add_row(vec![
                    channel.to_string(),
                    method.to_string(),
                    format!("{}ms", elapsed.as_millis()),
                    result.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let rendered =
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
            println!("{channel}#{method} -> {rendered}");
        }
    }
}

#[derive(Serialize)]
struct SchemaOutput<'a> {
    schema_id: &'a str,
    #[serde(flatten)]
    document: &'a SchemaDocument,
}

pub fn print_schema(document: &SchemaDocument, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SchemaOutput {
                schema_id: TYPE_SCHEMA,
                document,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "KIND", "NAME", "MEMBERS"]);
            for schema in &document.enums {
                table.add_row(vec![
                    schema.type_id.to_string(),
                    "enum".to_string(),
                    schema.name.clone(),
                    schema.variants.join(", "),
                ]);
            }
            for schema in &document.composites {
                let fields: Vec<String> = schema
                    .fields
                    .iter()
                    .map(|f| {
                        let suffix = if f.nullable { "?" } else { "" };
                        format!("{}: {}{suffix}", f.name, field_type_name(&f.field_type))
                    })
                    .collect();
                table.add_row(vec![
                    schema.type_id.to_string(),
                    "composite".to_string(),
                    schema.name.clone(),
                    fields.join("\n"),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for schema in &document.enums {
                println!("enum {} = {} {{ {} }}", schema.name, schema.type_id, schema.variants.join(", "));
            }
            for schema in &document.composites {
                println!("composite {} = {} {{", schema.name, schema.type_id);
                for f in &schema.fields {
                    let suffix = if f.nullable { "?" } else { "" };
                    println!("  {}: {}{suffix}", f.name, field_type_name(&f.field_type));
                }
                println!("}}");
            }
        }
    }
}

fn field_type_name(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Enum(id) => format!("enum#{id}"),
        FieldType::Composite(id) => format!("composite#{id}"),
        other => format!("{other:?}").to_lowercase(),
    }
}
