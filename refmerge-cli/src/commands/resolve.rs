//! Resolve command: register mention records, print canonical entities

use std::collections::BTreeMap;

use clap::Parser;
use serde::Deserialize;
use serde_json::Value;

use refmerge::{Config, DocumentSession, EntitySummary, Referent, ReferentId, ReferentKind, SlotValue};

use crate::output::{color, log_info, read_input_file, write_output};
use crate::parser::OutputFormat;

/// Register mention records and print the canonical entities
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// JSON-lines file of mention records
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Document text the record offsets refer to
    #[arg(short, long, value_name = "PATH")]
    pub text: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,

    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

/// One input line.
#[derive(Debug, Deserialize)]
pub struct MentionRecord {
    /// Kind name (`geo`, `street`, `organization`, `person`, `generic`)
    pub kind: String,
    /// Attribute name to a value or an array of values
    #[serde(default)]
    pub slots: BTreeMap<String, Value>,
    /// Start character offset
    pub begin: Option<usize>,
    /// End character offset (exclusive)
    pub end: Option<usize>,
}

/// Where an earlier record ended up.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    id: ReferentId,
    span: Option<(usize, usize)>,
}

pub fn run(args: ResolveArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => Config::from_file(path).map_err(|e| format!("{}: {}", path, e))?,
        None => Config::default(),
    };
    let text = match &args.text {
        Some(path) => read_input_file(path)?,
        None => String::new(),
    };
    let input = read_input_file(&args.file)?;

    let mut session = DocumentSession::from_config(text, &config).map_err(|e| e.to_string())?;
    let mut resolved: Vec<Option<Resolved>> = Vec::new();
    let mut rejected = 0usize;

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no = index + 1;
        let record: MentionRecord =
            serde_json::from_str(line).map_err(|e| format!("line {}: {}", line_no, e))?;
        let referent = build_referent(&record, &resolved, &session)
            .map_err(|e| format!("line {}: {}", line_no, e))?;

        let span = record.begin.zip(record.end);
        let id = match span {
            Some((begin, end)) => session.register_at(referent, begin, end),
            None => {
                let id = session.alloc(referent);
                session.register(id)
            }
        };
        if id.is_none() {
            rejected += 1;
            log::info!("line {}: rejected", line_no);
        }
        resolved.push(id.map(|id| Resolved { id, span }));
    }

    let entities = session.entities();
    log_info(
        &format!(
            "{} records, {} entities, {} rejected",
            resolved.len(),
            entities.len(),
            rejected
        ),
        args.quiet,
    );

    let rendered = match args.format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&entities)
                .map_err(|e| format!("Failed to serialize entities: {}", e))?;
            json.push('\n');
            json
        }
        OutputFormat::Jsonl => {
            let mut out = String::new();
            for entity in &entities {
                let line = serde_json::to_string(entity)
                    .map_err(|e| format!("Failed to serialize entity: {}", e))?;
                out.push_str(&line);
                out.push('\n');
            }
            out
        }
        OutputFormat::Text => render_text(&entities),
    };
    write_output(&rendered, args.output.as_deref())
}

/// Record index references resolve to the entity the record ended up in.
fn build_referent(
    record: &MentionRecord,
    resolved: &[Option<Resolved>],
    session: &DocumentSession,
) -> Result<Referent, String> {
    let kind: ReferentKind = record.kind.parse().map_err(|e| format!("{}", e))?;
    let mut referent = Referent::new(kind);
    for (name, value) in &record.slots {
        let values = match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        };
        for value in values {
            let slot = slot_value(value, resolved, session)
                .map_err(|e| format!("slot {}: {}", name, e))?;
            referent.add_slot(name, slot, false, 1);
        }
    }
    Ok(referent)
}

fn slot_value(
    value: &Value,
    resolved: &[Option<Resolved>],
    session: &DocumentSession,
) -> Result<SlotValue, String> {
    match value {
        Value::String(s) => Ok(SlotValue::Text(s.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(SlotValue::Int)
            .ok_or_else(|| format!("unsupported number {}", n)),
        Value::Object(map) => {
            let index = map
                .get("ref")
                .and_then(Value::as_u64)
                .ok_or_else(|| "objects must be {\"ref\": N}".to_string())?;
            let target = resolved
                .get(index as usize)
                .copied()
                .ok_or_else(|| format!("ref {} points past earlier records", index))?
                .ok_or_else(|| format!("ref {} points at a rejected record", index))?;
            current_id(target, session)
                .map(SlotValue::Referent)
                .ok_or_else(|| format!("ref {} no longer resolves", index))
        }
        other => Err(format!("unsupported value {}", other)),
    }
}

/// The record's referent may have been merged away since; its span follows merges.
fn current_id(target: Resolved, session: &DocumentSession) -> Option<ReferentId> {
    if let Some((begin, end)) = target.span {
        if let Some(id) = session.kit().referent_of(begin, end) {
            return Some(id);
        }
    }
    session.referent(target.id).map(|_| target.id)
}

fn render_text(entities: &[EntitySummary]) -> String {
    let mut out = String::new();
    for entity in entities {
        let slots: Vec<String> = entity
            .slots
            .iter()
            .map(|s| format!("{}={}", s.name, s.value))
            .collect();
        out.push_str(&format!(
            "{} {} {} [{}] mentions={}\n",
            color("90", &entity.id.to_string()),
            color("1;33", entity.kind.type_name()),
            color("1;36", &entity.canonical),
            slots.join(", "),
            entity.occurrences.len()
        ));
    }
    out
}
