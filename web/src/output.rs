use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    mongo::{
        bson::{doc, to_document, Bson, Document},
        withid::WithId,
    },
    utils::result::Result,
};

pub fn record<M: Serialize>(record: &WithId<M>) -> Result<Document> {
    let mut out = doc! { "_id": record.0 };
    out.extend(to_document(&record.1)?);
    Ok(out)
}

pub fn json(doc: Document) -> Value {
    plain(Bson::Document(doc).into_relaxed_extjson())
}

pub fn json_record<M: Serialize>(model: &WithId<M>) -> Result<Value> {
    Ok(json(record(model)?))
}

fn plain(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(s)) = map.get("$oid").or_else(|| map.get("$date")) {
                    return Value::String(s.clone());
                }
            }
            Value::Object(map.into_iter().map(|(k, v)| (k, plain(v))).collect::<Map<_, _>>())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(plain).collect()),
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mongo::{bson::DateTime, withid::Id};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Serialize)]
    struct Post {
        title: String,
        author: Id,
        at: DateTime,
        tags: Vec<Id>,
    }

    #[test]
    fn test_json_record() {
        let id = Id::new();
        let author = Id::new();
        let post = Post {
            title: "t".into(),
            author,
            at: DateTime::from_millis(0),
            tags: vec![author],
        };
        let value = json_record(&WithId(id, post)).unwrap();
        assert_eq!(
            json!({
                "_id": id.to_hex(),
                "title": "t",
                "author": author.to_hex(),
                "at": "1970-01-01T00:00:00Z",
                "tags": [author.to_hex()],
            }),
            value
        );
    }

    #[test]
    fn test_keeps_ordinary_objects() {
        let value = json(doc! { "meta": { "$oid": 1, "x": 2 } });
        assert_eq!(json!({ "meta": { "$oid": 1, "x": 2 } }), value);
    }
}
