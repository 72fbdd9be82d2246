use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

const ROOT_ELEMENT: &str = "tv";

#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error("guide root element is {0:?}, expected <tv>")]
    UnexpectedRoot(Option<String>),
    #[error("could not parse guide: {0}")]
    Parse(String),
    #[error("could not serialize guide: {0}")]
    Serialize(String),
}

/// text node with an optional lang attribute, used for titles, names and descriptions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextLang {
    #[serde(rename = "@lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(rename = "$text", default)]
    pub text: String,
}

impl TextLang {
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            lang: Some("en".to_string()),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "@src")]
    pub src: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideChannel {
    #[serde(rename = "@id", default)]
    pub id: String,
    #[serde(rename = "display-name", default)]
    pub display_names: Vec<TextLang>,
    #[serde(rename = "icon", default, skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<Icon>,
    #[serde(rename = "url", default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Programme {
    #[serde(rename = "@start", default)]
    pub start: String,
    #[serde(rename = "@stop", default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<String>,
    #[serde(rename = "@channel", default)]
    pub channel: String,
    #[serde(rename = "title", default)]
    pub titles: Vec<TextLang>,
    #[serde(rename = "sub-title", default, skip_serializing_if = "Vec::is_empty")]
    pub sub_titles: Vec<TextLang>,
    // xmltv allows one per language
    #[serde(rename = "desc", default, skip_serializing_if = "Vec::is_empty")]
    pub descriptions: Vec<TextLang>,
}

/// the xmltv document. Only what we model survives a parse and serialize round, anything else in
/// the base document is dropped
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideDocument {
    #[serde(
        rename = "@generator-info-name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generator_info_name: Option<String>,
    #[serde(
        rename = "@generator-info-url",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generator_info_url: Option<String>,
    #[serde(rename = "channel", default)]
    pub channels: Vec<GuideChannel>,
    #[serde(rename = "programme", default)]
    pub programmes: Vec<Programme>,
}

impl GuideDocument {
    pub fn parse(text: &str) -> Result<Self, GuideError> {
        let root = root_element(text);
        if root.as_deref() != Some(ROOT_ELEMENT) {
            return Err(GuideError::UnexpectedRoot(root));
        }

        quick_xml::de::from_str(text).map_err(|e| GuideError::Parse(e.to_string()))
    }

    /// declaration plus the document indented by four spaces
    pub fn to_xml(&self) -> Result<String, GuideError> {
        let mut body = String::new();

        let mut serializer = quick_xml::se::Serializer::with_root(&mut body, Some(ROOT_ELEMENT))
            .map_err(|e| GuideError::Serialize(e.to_string()))?;
        serializer.indent(' ', 4);

        self.serialize(serializer)
            .map_err(|e| GuideError::Serialize(e.to_string()))?;

        Ok(format!("{}{}", XML_DECLARATION, body))
    }
}

fn root_element(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}
