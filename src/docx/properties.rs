use crate::model::{
    BorderSide, Indentation, Numbering, ParagraphBorders, ParagraphProperties, RunFonts,
    RunProperties, Shading, Spacing, TabStop,
};
use crate::xml::Element;

use super::{w_attr, wml, wml_attr, wml_bool};

fn parse_border_side(node: &Element) -> BorderSide {
    BorderSide {
        style: w_attr(node, "val"),
        size: w_attr(node, "sz"),
        space: w_attr(node, "space"),
        color: w_attr(node, "color"),
        shadow: w_attr(node, "shadow"),
    }
}

fn parse_paragraph_borders(ppr: &Element) -> ParagraphBorders {
    let Some(pbdr) = wml(ppr, "pBdr") else {
        return ParagraphBorders::default();
    };
    ParagraphBorders {
        top: wml(pbdr, "top").map(parse_border_side),
        bottom: wml(pbdr, "bottom").map(parse_border_side),
        left: wml(pbdr, "left").map(parse_border_side),
        right: wml(pbdr, "right").map(parse_border_side),
        between: wml(pbdr, "between").map(parse_border_side),
    }
}

fn parse_tab_stops(ppr: &Element) -> Vec<TabStop> {
    let Some(tabs) = wml(ppr, "tabs") else {
        return vec![];
    };
    tabs.child_elements()
        .filter(|n| n.is_wml("tab"))
        .map(|n| TabStop {
            position: w_attr(n, "pos"),
            alignment: w_attr(n, "val"),
            leader: w_attr(n, "leader"),
        })
        .collect()
}

pub(crate) fn parse_paragraph_properties(ppr: Option<&Element>) -> ParagraphProperties {
    let Some(ppr) = ppr else {
        return ParagraphProperties::default();
    };

    let spacing = wml(ppr, "spacing")
        .map(|n| Spacing {
            before: w_attr(n, "before"),
            after: w_attr(n, "after"),
            line: w_attr(n, "line"),
            line_rule: w_attr(n, "lineRule"),
        })
        .unwrap_or_default();

    // w:start / w:end are the bidi-aware spellings of left / right.
    let indentation = wml(ppr, "ind")
        .map(|n| Indentation {
            left: w_attr(n, "left").or_else(|| w_attr(n, "start")),
            right: w_attr(n, "right").or_else(|| w_attr(n, "end")),
            first_line: w_attr(n, "firstLine"),
            hanging: w_attr(n, "hanging"),
        })
        .unwrap_or_default();

    let shading = wml(ppr, "shd").map(|n| Shading {
        val: w_attr(n, "val"),
        color: w_attr(n, "color"),
        fill: w_attr(n, "fill"),
    });

    let numbering = wml(ppr, "numPr").map(|n| Numbering {
        level: wml_attr(n, "ilvl").map(str::to_string),
        id: wml_attr(n, "numId").map(str::to_string),
    });

    ParagraphProperties {
        style: wml_attr(ppr, "pStyle").map(str::to_string),
        alignment: wml_attr(ppr, "jc").map(str::to_string),
        spacing,
        indentation,
        borders: parse_paragraph_borders(ppr),
        shading,
        tabs: parse_tab_stops(ppr),
        numbering,
        page_break_before: wml_bool(ppr, "pageBreakBefore").unwrap_or(false),
        keep_lines: wml_bool(ppr, "keepLines").unwrap_or(false),
        keep_next: wml_bool(ppr, "keepNext").unwrap_or(false),
        outline_level: wml_attr(ppr, "outlineLvl").and_then(|v| v.parse().ok()),
    }
}

pub(crate) fn parse_run_properties(rpr: Option<&Element>) -> RunProperties {
    let Some(rpr) = rpr else {
        return RunProperties::default();
    };
    let fonts = wml(rpr, "rFonts")
        .map(|n| RunFonts {
            ascii: w_attr(n, "ascii"),
            h_ansi: w_attr(n, "hAnsi"),
            east_asia: w_attr(n, "eastAsia"),
            cs: w_attr(n, "cs"),
        })
        .unwrap_or_default();

    RunProperties {
        fonts,
        size: wml_attr(rpr, "sz").map(str::to_string),
        color: wml_attr(rpr, "color").map(str::to_string),
        bold: wml_bool(rpr, "b").unwrap_or(false),
        italic: wml_bool(rpr, "i").unwrap_or(false),
        underline: wml_attr(rpr, "u").map(str::to_string),
        strike: wml_bool(rpr, "strike").unwrap_or(false),
        caps: wml_bool(rpr, "caps").unwrap_or(false),
        highlight: wml_attr(rpr, "highlight").map(str::to_string),
        vertical_align: wml_attr(rpr, "vertAlign").map(str::to_string),
        spacing: wml_attr(rpr, "spacing").map(str::to_string),
        position: wml_attr(rpr, "position").map(str::to_string),
        style: wml_attr(rpr, "rStyle").map(str::to_string),
    }
}
