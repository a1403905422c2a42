use std::collections::HashMap;

use crate::model::ListKind;
use crate::xml::XmlDocument;

use super::{wml, wml_attr};

pub(crate) struct ParagraphStyle {
    pub(crate) based_on: Option<String>,
    pub(crate) num_id: Option<String>,
    pub(crate) num_level: Option<String>,
}

#[derive(Default)]
pub(crate) struct StylesInfo {
    pub(crate) paragraph_styles: HashMap<String, ParagraphStyle>,
    pub(crate) default_paragraph_style: Option<String>,
}

impl StylesInfo {
    /// Numbering (numId, ilvl) a paragraph style carries, following basedOn.
    pub(crate) fn style_numbering(&self, style_id: &str) -> Option<(&str, Option<&str>)> {
        let mut current = Some(style_id);
        // basedOn chains can be cyclic in damaged documents
        for _ in 0..16 {
            let style = self.paragraph_styles.get(current?)?;
            if let Some(num_id) = style.num_id.as_deref() {
                return Some((num_id, style.num_level.as_deref()));
            }
            current = style.based_on.as_deref();
        }
        None
    }
}

pub(crate) fn parse_styles(xml: Option<&XmlDocument>) -> StylesInfo {
    let mut info = StylesInfo::default();
    let Some(xml) = xml else {
        return info;
    };

    for style in xml.root.child_elements().filter(|n| n.is_wml("style")) {
        if style.attr(crate::ns::WML, "type") != Some("paragraph") {
            continue;
        }
        let Some(style_id) = style.attr(crate::ns::WML, "styleId") else {
            continue;
        };
        if style
            .attr(crate::ns::WML, "default")
            .is_some_and(|v| v == "1" || v == "true")
        {
            info.default_paragraph_style = Some(style_id.to_string());
        }
        let num_pr = wml(style, "pPr").and_then(|ppr| wml(ppr, "numPr"));
        info.paragraph_styles.insert(
            style_id.to_string(),
            ParagraphStyle {
                based_on: wml_attr(style, "basedOn").map(str::to_string),
                num_id: num_pr.and_then(|n| wml_attr(n, "numId")).map(str::to_string),
                num_level: num_pr.and_then(|n| wml_attr(n, "ilvl")).map(str::to_string),
            },
        );
    }
    info
}

#[derive(Default)]
pub(crate) struct NumberingInfo {
    /// abstractNumId -> ilvl -> numFmt
    abstract_formats: HashMap<String, HashMap<u8, String>>,
    num_to_abstract: HashMap<String, String>,
}

impl NumberingInfo {
    /// `None` when the numbering is absent or switched off (`numId` 0).
    pub(crate) fn list_kind(&self, num_id: &str, level: Option<&str>) -> Option<ListKind> {
        if num_id == "0" {
            return None;
        }
        let level: u8 = level.and_then(|l| l.parse().ok()).unwrap_or(0);
        let format = self
            .num_to_abstract
            .get(num_id)
            .and_then(|abs| self.abstract_formats.get(abs))
            .and_then(|levels| levels.get(&level));
        match format.map(String::as_str) {
            Some("bullet") | None => Some(ListKind::Bullet),
            Some("none") => None,
            Some(_) => Some(ListKind::Numbered),
        }
    }
}

pub(crate) fn parse_numbering(xml: Option<&XmlDocument>) -> NumberingInfo {
    let mut info = NumberingInfo::default();
    let Some(xml) = xml else {
        return info;
    };

    for node in xml.root.child_elements() {
        if node.is_wml("abstractNum") {
            let Some(abs_id) = node.attr(crate::ns::WML, "abstractNumId") else {
                continue;
            };
            let mut levels = HashMap::new();
            for lvl in node.child_elements().filter(|n| n.is_wml("lvl")) {
                let Some(ilvl) = lvl
                    .attr(crate::ns::WML, "ilvl")
                    .and_then(|v| v.parse::<u8>().ok())
                else {
                    continue;
                };
                let num_fmt = wml_attr(lvl, "numFmt").unwrap_or("bullet").to_string();
                levels.insert(ilvl, num_fmt);
            }
            info.abstract_formats.insert(abs_id.to_string(), levels);
        } else if node.is_wml("num") {
            let Some(num_id) = node.attr(crate::ns::WML, "numId") else {
                continue;
            };
            let Some(abs_id) = wml_attr(node, "abstractNumId") else {
                continue;
            };
            info.num_to_abstract
                .insert(num_id.to_string(), abs_id.to_string());
        }
    }
    info
}
