use serde::{Deserialize, Serialize};

use crate::layout::ConnectorKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub background: String,
    pub title_color: String,
    pub connection_stroke_color: String,
    pub connection_fill_color: String,
    pub checkout_color: String,
    pub commit_color: String,
    pub merge_color: String,
    pub branch_fill_color: String,
    pub branch_stroke_color: String,
}

impl Theme {
    /// Gray connectors with blue checkouts, green commits and red merges.
    pub fn classic() -> Self {
        Self {
            font_family: "DejaVu Sans, Arial, Helvetica, sans-serif".to_string(),
            background: "#fff".to_string(),
            title_color: "#606060".to_string(),
            connection_stroke_color: "#606060".to_string(),
            connection_fill_color: "#fff".to_string(),
            checkout_color: "#0083b3".to_string(),
            commit_color: "#00b368".to_string(),
            merge_color: "#b30000".to_string(),
            branch_fill_color: "#fff".to_string(),
            branch_stroke_color: "#606060".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            background: "#FFFFFF".to_string(),
            title_color: "#1C2430".to_string(),
            connection_stroke_color: "#7A8AA6".to_string(),
            connection_fill_color: "#FFFFFF".to_string(),
            checkout_color: "#3B82F6".to_string(),
            commit_color: "#10B981".to_string(),
            merge_color: "#EF4444".to_string(),
            branch_fill_color: "#F8FAFF".to_string(),
            branch_stroke_color: "#7A8AA6".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "base" => Some(Self::classic()),
            _ => None,
        }
    }

    /// Stroke color for a connector of `kind`.
    pub fn connector_color(&self, kind: ConnectorKind) -> &str {
        match kind {
            ConnectorKind::Checkout => &self.checkout_color,
            ConnectorKind::Commit => &self.commit_color,
            ConnectorKind::Merge => &self.merge_color,
            ConnectorKind::Continuation => &self.connection_stroke_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_colors_follow_their_kind() {
        let theme = Theme::classic();
        let checkout = theme.connector_color(ConnectorKind::Checkout);
        let commit = theme.connector_color(ConnectorKind::Commit);
        let merge = theme.connector_color(ConnectorKind::Merge);
        assert_ne!(checkout, commit);
        assert_ne!(commit, merge);
        assert_ne!(checkout, merge);
        assert_eq!(
            theme.connector_color(ConnectorKind::Continuation),
            theme.connection_stroke_color
        );
    }

    #[test]
    fn resolves_theme_names() {
        assert_eq!(Theme::by_name("modern").unwrap().merge_color, "#EF4444");
        assert_eq!(Theme::by_name("default").unwrap().merge_color, "#b30000");
        assert!(Theme::by_name("neon").is_none());
    }
}
