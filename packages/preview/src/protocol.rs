//! # Surface Protocol
//!
//! Messages exchanged between the editing host and a rendering surface.
//! Both transports (in-process channels and the designer WebSocket) carry the
//! same `type`-tagged JSON:
//!
//! ```text
//! host → surface   {"type":"render","source":"<div ...>","selected":"el-0"}
//!                  {"type":"get-style","uid":"el-0"}
//! surface → host   {"type":"select","uid":"el-0"}
//!                  {"type":"error","message":"..."}
//!                  {"type":"style-data","uid":"el-0","styles":{"color":"red"}}
//! ```
//!
//! Elements are addressed by identifier only, never by object reference.

use crate::PreviewError;
use serde::{Deserialize, Serialize};
use visedit_common::StyleMap;

/// Host → surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HostMessage {
    /// Full re-render of `source`, restoring the highlight on `selected`
    Render {
        source: String,
        selected: Option<String>,
    },

    /// Ask for the resolved style of `uid`; unanswered if no such element
    GetStyle { uid: String },
}

/// Surface → host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceMessage {
    Select { uid: String },
    Error { message: String },
    StyleData { uid: String, styles: StyleMap },
}

impl HostMessage {
    pub fn to_json(&self) -> Result<String, PreviewError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PreviewError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl SurfaceMessage {
    pub fn to_json(&self) -> Result<String, PreviewError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, PreviewError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_message_wire_format() {
        let render = HostMessage::Render {
            source: "<div />".to_string(),
            selected: None,
        };
        assert_eq!(
            render.to_json().unwrap(),
            r#"{"type":"render","source":"<div />","selected":null}"#
        );

        let query = HostMessage::GetStyle {
            uid: "el-0".to_string(),
        };
        assert_eq!(query.to_json().unwrap(), r#"{"type":"get-style","uid":"el-0"}"#);
    }

    #[test]
    fn test_style_data_normalizes_property_names() {
        let message = SurfaceMessage::from_json(
            r#"{"type":"style-data","uid":"el-1","styles":{"font-size":"16px","color":"red"}}"#,
        )
        .unwrap();

        match message {
            SurfaceMessage::StyleData { uid, styles } => {
                assert_eq!(uid, "el-1");
                assert_eq!(styles.keys().collect::<Vec<_>>(), vec!["fontSize", "color"]);
            }
            other => panic!("Expected style-data, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_message_type_is_protocol_error() {
        let err = SurfaceMessage::from_json(r#"{"type":"hover","uid":"el-0"}"#).unwrap_err();
        assert!(matches!(err, PreviewError::Protocol(_)));
    }
}
