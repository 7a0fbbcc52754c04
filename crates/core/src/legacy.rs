//! Validated representations of legacy export records.
//!
//! The exports are loosely typed: ids show up as numbers or numeric strings,
//! optional text as `null` or numbers. Each record type is decoded from a
//! [`serde_json::Value`] here so the importers only ever see checked fields.

use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::{timestamp_from_epoch, DbId, Timestamp};

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

type Object = Map<String, Value>;

fn invalid(entity: &str, field: &str, detail: &str) -> CoreError {
    CoreError::Validation(format!("{entity}.{field}: {detail}"))
}

fn required<'a>(obj: &'a Object, entity: &str, field: &str) -> Result<&'a Value, CoreError> {
    obj.get(field)
        .ok_or_else(|| invalid(entity, field, "missing field"))
}

/// Integer field; accepts JSON numbers and numeric strings.
fn int_field(obj: &Object, entity: &str, field: &str) -> Result<i64, CoreError> {
    match required(obj, entity, field)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| invalid(entity, field, "not an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(entity, field, "not an integer")),
        _ => Err(invalid(entity, field, "not an integer")),
    }
}

/// Text field; `null` becomes the empty string and scalars are stringified.
fn text_field(obj: &Object, entity: &str, field: &str) -> Result<String, CoreError> {
    match required(obj, entity, field)? {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(invalid(entity, field, "not a scalar value")),
    }
}

fn timestamp_field(obj: &Object, entity: &str, field: &str) -> Result<Timestamp, CoreError> {
    let secs = int_field(obj, entity, field)?;
    timestamp_from_epoch(secs).ok_or_else(|| invalid(entity, field, "timestamp out of range"))
}

// ---------------------------------------------------------------------------
// Record trait
// ---------------------------------------------------------------------------

/// A legacy record type decodable from one element of an export array.
pub trait LegacyRecord: Sized {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn decode(obj: &Object) -> Result<Self, CoreError>;
}

/// Decode a whole export (a JSON array) into validated records.
pub fn decode_records<T: LegacyRecord>(json: &str) -> Result<Vec<T>, CoreError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Array(items) = value else {
        return Err(CoreError::MalformedExport(format!(
            "{} export is not a JSON array",
            T::ENTITY
        )));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(obj) => T::decode(obj),
            _ => Err(CoreError::Validation(format!(
                "{} record at index {i} is not an object",
                T::ENTITY
            ))),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// `{pk, fields: {title, subtitle, slug}}`
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyCategory {
    pub id: DbId,
    pub title: String,
    pub subtitle: String,
    pub slug: String,
}

impl LegacyRecord for LegacyCategory {
    const ENTITY: &'static str = "category";

    fn decode(obj: &Object) -> Result<Self, CoreError> {
        let id = int_field(obj, Self::ENTITY, "pk")?;
        let Value::Object(fields) = required(obj, Self::ENTITY, "fields")? else {
            return Err(invalid(Self::ENTITY, "fields", "not an object"));
        };
        Ok(Self {
            id,
            title: text_field(fields, Self::ENTITY, "title")?,
            subtitle: text_field(fields, Self::ENTITY, "subtitle")?,
            slug: text_field(fields, Self::ENTITY, "slug")?,
        })
    }
}

/// `{userid, login, usermail, registerdate, userlogo, usercitation, usersite}`
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyUser {
    pub id: DbId,
    pub login: String,
    pub email: String,
    pub registered: Timestamp,
    pub logo: String,
    pub quote: String,
    pub website: String,
}

impl LegacyRecord for LegacyUser {
    const ENTITY: &'static str = "user";

    fn decode(obj: &Object) -> Result<Self, CoreError> {
        let e = Self::ENTITY;
        Ok(Self {
            id: int_field(obj, e, "userid")?,
            login: text_field(obj, e, "login")?,
            email: text_field(obj, e, "usermail")?,
            registered: timestamp_field(obj, e, "registerdate")?,
            logo: text_field(obj, e, "userlogo")?,
            quote: text_field(obj, e, "usercitation")?,
            website: text_field(obj, e, "usersite")?,
        })
    }
}

/// `{idtopic, idforum, sujet, idmembre, icone, nbvues, postit}`
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyThread {
    pub id: DbId,
    pub forum_id: DbId,
    pub subject: String,
    pub author_id: DbId,
    pub icon: String,
    pub view_count: i64,
    pub sticky: bool,
}

impl LegacyRecord for LegacyThread {
    const ENTITY: &'static str = "thread";

    fn decode(obj: &Object) -> Result<Self, CoreError> {
        let e = Self::ENTITY;
        Ok(Self {
            id: int_field(obj, e, "idtopic")?,
            forum_id: int_field(obj, e, "idforum")?,
            subject: text_field(obj, e, "sujet")?,
            author_id: int_field(obj, e, "idmembre")?,
            icon: text_field(obj, e, "icone")?,
            view_count: int_field(obj, e, "nbvues")?,
            sticky: int_field(obj, e, "postit")? == 1,
        })
    }
}

/// `{idpost, parent, idmembre, date, msg}`
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPost {
    pub id: DbId,
    pub thread_id: DbId,
    pub author_id: DbId,
    pub created: Timestamp,
    pub body: String,
}

impl LegacyRecord for LegacyPost {
    const ENTITY: &'static str = "post";

    fn decode(obj: &Object) -> Result<Self, CoreError> {
        let e = Self::ENTITY;
        Ok(Self {
            id: int_field(obj, e, "idpost")?,
            thread_id: int_field(obj, e, "parent")?,
            author_id: int_field(obj, e, "idmembre")?,
            created: timestamp_field(obj, e, "date")?,
            body: text_field(obj, e, "msg")?,
        })
    }
}

/// `{iddest, idexp, msg, date}`
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyPrivateMessage {
    pub recipient_id: DbId,
    pub sender_id: DbId,
    pub body: String,
    pub sent: Timestamp,
}

impl LegacyRecord for LegacyPrivateMessage {
    const ENTITY: &'static str = "private message";

    fn decode(obj: &Object) -> Result<Self, CoreError> {
        let e = Self::ENTITY;
        Ok(Self {
            recipient_id: int_field(obj, e, "iddest")?,
            sender_id: int_field(obj, e, "idexp")?,
            body: text_field(obj, e, "msg")?,
            sent: timestamp_field(obj, e, "date")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn decodes_categories() {
        let json = r#"[{"pk": 3, "model": "forum.category",
            "fields": {"title": "Jeux", "subtitle": "Tout sur les jeux", "slug": "jeux"}}]"#;
        let cats: Vec<LegacyCategory> = decode_records(json).unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].id, 3);
        assert_eq!(cats[0].slug, "jeux");
    }

    #[test]
    fn user_ids_accept_numeric_strings() {
        let json = r#"[{"userid": "17", "login": "bob", "usermail": "b@x.org",
            "registerdate": 1100000000, "userlogo": "b.gif",
            "usercitation": null, "usersite": 42}]"#;
        let users: Vec<LegacyUser> = decode_records(json).unwrap();
        assert_eq!(users[0].id, 17);
        assert_eq!(users[0].quote, "");
        assert_eq!(users[0].website, "42");
        assert_eq!(users[0].registered.timestamp(), 1_100_000_000);
    }

    #[test]
    fn thread_sticky_only_when_postit_is_one() {
        let json = r#"[
            {"idtopic": 1, "idforum": 2, "sujet": "a", "idmembre": 5, "icone": "icon1", "nbvues": 10, "postit": 1},
            {"idtopic": 2, "idforum": 2, "sujet": "b", "idmembre": 5, "icone": "icon1", "nbvues": "3", "postit": 0}
        ]"#;
        let threads: Vec<LegacyThread> = decode_records(json).unwrap();
        assert!(threads[0].sticky);
        assert!(!threads[1].sticky);
        assert_eq!(threads[1].view_count, 3);
    }

    #[test]
    fn post_with_bad_id_is_rejected() {
        let json = r#"[{"idpost": "abc", "parent": 1, "idmembre": 1, "date": 0, "msg": "x"}]"#;
        let err = decode_records::<LegacyPost>(json).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("post.idpost"));
    }

    #[test]
    fn integral_float_ids_are_accepted() {
        let json = r#"[{"idpost": 12.0, "parent": 1, "idmembre": 1, "date": 0, "msg": "x"}]"#;
        let posts: Vec<LegacyPost> = decode_records(json).unwrap();
        assert_eq!(posts[0].id, 12);
    }

    #[test]
    fn out_of_range_float_id_is_rejected() {
        let json = r#"[{"idpost": 1e30, "parent": 1, "idmembre": 1, "date": 0, "msg": "x"}]"#;
        let err = decode_records::<LegacyPost>(json).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("post.idpost"));
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"[{"iddest": 1, "idexp": 2, "msg": "x"}]"#;
        let err = decode_records::<LegacyPrivateMessage>(json).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("date"));
    }

    #[test]
    fn non_array_export_is_malformed() {
        let err = decode_records::<LegacyPost>(r#"{"idpost": 1}"#).unwrap_err();
        assert_matches!(err, CoreError::MalformedExport(_));
    }

    #[test]
    fn invalid_json_surfaces_parse_error() {
        let err = decode_records::<LegacyPost>("[{").unwrap_err();
        assert_matches!(err, CoreError::Json(_));
    }
}
