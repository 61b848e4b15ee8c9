//! Plain-text rendering of a stored briefing, used for export

use serde_json::Value;

use crate::normalize::NormalizedContent;
use crate::time::format_display;

const SECTIONS: [(&str, &str); 6] = [
    ("objetivo", "Objetivo"),
    ("publico_alvo", "Público-alvo"),
    ("referencias", "Referências"),
    ("prazos", "Prazos"),
    ("orcamento", "Orçamento"),
    ("observacoes", "Observações"),
];

/// Render a briefing as plain text
///
/// Works on normalized content so that legacy records whose result does not
/// satisfy the schema still render whatever sections they have.
pub fn render_text(title: &str, created_at: &str, content: &NormalizedContent) -> String {
    let mut out = String::new();
    push_line(&mut out, title);
    push_line(&mut out, &format!("Criado em: {}", format_display(created_at)));

    for (key, label) in SECTIONS {
        let Some(value) = content.briefing_result.get(key) else {
            continue;
        };
        push_line(&mut out, &format!("\n{}", label));
        render_value(&mut out, value, key == "orcamento");
    }

    if !content.input_text.trim().is_empty() {
        push_line(&mut out, "\nConversa original");
        for line in content.input_text.lines() {
            push_line(&mut out, &format!("  {}", line));
        }
    }

    out
}

fn render_value(out: &mut String, value: &Value, money: bool) {
    match value {
        Value::Array(items) if items.is_empty() => {
            push_line(out, "  (nenhum)");
        }
        Value::Array(items) => {
            for item in items {
                push_line(out, &format!("  - {}", scalar(item, money)));
            }
        }
        Value::Object(map) if map.is_empty() => {
            push_line(out, "  (nenhum)");
        }
        Value::Object(map) => {
            for (label, item) in map {
                push_line(out, &format!("  - {}: {}", label, scalar(item, money)));
            }
        }
        other => {
            push_line(out, &format!("  {}", scalar(other, money)));
        }
    }
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn scalar(value: &Value, money: bool) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if money => match n.as_f64() {
            Some(amount) => format!("R$ {:.2}", amount),
            None => n.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
