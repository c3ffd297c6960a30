use clinic_core::{Failure, FieldError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

fn friendly_message(code: &str) -> Option<&'static str> {
    match code {
        "required" => Some("é obrigatório"),
        "email" => Some("deve ser um e-mail válido"),
        "length" => Some("tem tamanho inválido"),
        "range" => Some("está fora do intervalo permitido"),
        "url" => Some("deve ser uma URL válida"),
        "regex" => Some("tem formato inválido"),
        _ => None,
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}.{field}")
    }
}

fn join_index(prefix: &str, idx: usize) -> String {
    format!("{prefix}[{idx}]")
}

fn push_validation_errors(out: &mut Vec<FieldError>, prefix: &str, errs: &validator::ValidationErrors) {
    for (field, kind) in errs.errors() {
        match kind {
            validator::ValidationErrorsKind::Field(field_errors) => {
                let key = join_path(prefix, field);
                for e in field_errors {
                    let msg = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .or_else(|| friendly_message(&e.code).map(|m| m.to_string()))
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(FieldError::new(key.clone(), msg));
                }
            }
            validator::ValidationErrorsKind::Struct(struct_errs) => {
                let next = join_path(prefix, field);
                push_validation_errors(out, &next, struct_errs.as_ref());
            }
            validator::ValidationErrorsKind::List(list_errs) => {
                let base = join_path(prefix, field);
                for (idx, nested) in list_errs {
                    let next = join_index(&base, *idx);
                    push_validation_errors(out, &next, nested.as_ref());
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PathSegment<'a> {
    Name(&'a str),
    Index(usize),
}

// `contatos[10].email` -> [Name("contatos"), Index(10), Name("email")]
fn path_segments(path: &str) -> Vec<PathSegment<'_>> {
    let mut out = Vec::new();
    for part in path.split('.') {
        let Some(open) = part.find('[') else {
            out.push(PathSegment::Name(part));
            continue;
        };
        out.push(PathSegment::Name(&part[..open]));

        let mut rest = &part[open..];
        while let Some(inner) = rest.strip_prefix('[') {
            let Some(close) = inner.find(']') else { break };
            let raw = &inner[..close];
            out.push(raw.parse().map_or(PathSegment::Name(raw), PathSegment::Index));
            rest = &inner[close + 1..];
        }
    }
    out
}

/// Flatten `validator` errors into `{field, message}` pairs.
///
/// `validator` keeps fields in a hash map, so the list is sorted by path to
/// keep responses deterministic. List indices compare as numbers; messages of
/// one field keep their order.
pub fn field_errors(errs: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut out = Vec::new();
    push_validation_errors(&mut out, "", errs);
    out.sort_by(|a, b| path_segments(&a.field).cmp(&path_segments(&b.field)));
    out
}

/// Deserialize and validate a record, reporting problems as a validation
/// failure.
pub fn validate<T>(data: &Value) -> Result<T, Failure>
where
    T: DeserializeOwned + Validate,
{
    let parsed: T = serde_json::from_value(data.clone()).map_err(|e| {
        Failure::validation()
            .with_fields([FieldError::new("_schema", "Formato de dados inválido")])
            .with_technical_message(e.to_string())
    })?;

    parsed.validate().map_err(|e| {
        Failure::validation()
            .with_fields(field_errors(&e))
            .with_technical_message(e.to_string())
    })?;

    Ok(parsed)
}

/// Failure for a uniqueness violation on `field`.
pub fn unique_violation(field: &str, message: impl Into<String>) -> Failure {
    Failure::unique_constraint().with_fields([FieldError::new(field, message)])
}
