use academy_core::model::{Module, ModuleDraft, ModuleId, ModuleKind, ModulePatch, ModuleSummary};

use super::markdown_vm::{markdown_to_html, normalize_markdown};
use super::time_fmt::format_date;

/// Row in the module list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleCardVm {
    pub id: ModuleId,
    pub title: String,
    pub kind_label: &'static str,
    pub created_label: String,
}

#[must_use]
pub fn map_module_cards(modules: &[ModuleSummary]) -> Vec<ModuleCardVm> {
    modules
        .iter()
        .map(|module| ModuleCardVm {
            id: module.id,
            title: module.title.clone(),
            kind_label: module.kind.label(),
            created_label: format!("Added {}", format_date(module.created_at)),
        })
        .collect()
}

/// Per-kind totals for an author's dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModuleCounts {
    pub total: usize,
    pub text: usize,
    pub video: usize,
}

impl ModuleCounts {
    #[must_use]
    pub fn from_summaries(modules: &[ModuleSummary]) -> Self {
        let video = modules
            .iter()
            .filter(|module| module.kind == ModuleKind::Video)
            .count();
        Self {
            total: modules.len(),
            text: modules.len() - video,
            video,
        }
    }
}

/// Body of a module page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModuleContentVm {
    /// Sanitized HTML rendered from Markdown.
    Html(String),
    Video { url: String },
}

impl ModuleContentVm {
    #[must_use]
    pub fn from_module(module: &Module) -> Self {
        match module.kind {
            ModuleKind::Text => ModuleContentVm::Html(markdown_to_html(&module.content)),
            ModuleKind::Video => ModuleContentVm::Video {
                url: module.content.trim().to_owned(),
            },
        }
    }
}

/// Offset paging over the module list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageVm {
    pub skip: u32,
    pub limit: u32,
    pub shown: usize,
}

impl PageVm {
    #[must_use]
    pub fn new(skip: u32, limit: u32, shown: usize) -> Self {
        Self { skip, limit, shown }
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.skip > 0
    }

    /// A full page suggests more rows may follow.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.limit > 0 && self.shown >= self.limit as usize
    }

    #[must_use]
    pub fn previous_skip(&self) -> u32 {
        self.skip.saturating_sub(self.limit)
    }

    #[must_use]
    pub fn next_skip(&self) -> u32 {
        self.skip.saturating_add(self.limit)
    }

    #[must_use]
    pub fn label(&self) -> String {
        if self.shown == 0 {
            return "No modules".to_owned();
        }
        let first = self.skip as usize + 1;
        let last = self.skip as usize + self.shown;
        format!("Modules {first}-{last}")
    }
}

/// Editable fields of the module form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleFormVm {
    pub title: String,
    pub content: String,
    pub kind: ModuleKind,
}

impl Default for ModuleFormVm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            kind: ModuleKind::Text,
        }
    }
}

impl ModuleFormVm {
    #[must_use]
    pub fn from_module(module: &Module) -> Self {
        Self {
            title: module.title.clone(),
            content: module.content.clone(),
            kind: module.kind,
        }
    }

    #[must_use]
    pub fn parse_kind(value: &str) -> ModuleKind {
        if value.eq_ignore_ascii_case("video") {
            ModuleKind::Video
        } else {
            ModuleKind::Text
        }
    }

    fn normalized_content(&self) -> String {
        match self.kind {
            ModuleKind::Text => normalize_markdown(&self.content),
            ModuleKind::Video => self.content.trim().to_owned(),
        }
    }

    #[must_use]
    pub fn to_draft(&self) -> ModuleDraft {
        ModuleDraft {
            title: self.title.clone(),
            content: self.normalized_content(),
            kind: self.kind,
        }
    }

    /// Only fields that differ from `original` are sent.
    #[must_use]
    pub fn to_patch(&self, original: &Module) -> ModulePatch {
        let content = self.normalized_content();
        ModulePatch {
            title: (self.title != original.title).then(|| self.title.clone()),
            content: (content != original.content).then_some(content),
            kind: (self.kind != original.kind).then_some(self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use academy_core::time::fixed_now;

    fn module(kind: ModuleKind, content: &str) -> Module {
        Module {
            id: ModuleId::new(3),
            title: "Closures".into(),
            content: content.into(),
            kind,
            created_at: fixed_now(),
            updated_at: None,
        }
    }

    #[test]
    fn text_modules_render_markdown_and_video_modules_link() {
        let text = ModuleContentVm::from_module(&module(ModuleKind::Text, "## Capture"));
        assert_eq!(text, ModuleContentVm::Html("<h2>Capture</h2>\n".into()));

        let video = ModuleContentVm::from_module(&module(
            ModuleKind::Video,
            " https://videos.example.com/closures ",
        ));
        assert_eq!(
            video,
            ModuleContentVm::Video {
                url: "https://videos.example.com/closures".into()
            }
        );
    }

    #[test]
    fn counts_split_by_kind() {
        let summary = |id, kind| ModuleSummary {
            id: ModuleId::new(id),
            title: format!("M{id}"),
            kind,
            created_at: fixed_now(),
        };
        let counts = ModuleCounts::from_summaries(&[
            summary(1, ModuleKind::Text),
            summary(2, ModuleKind::Video),
            summary(3, ModuleKind::Text),
        ]);
        assert_eq!(
            counts,
            ModuleCounts {
                total: 3,
                text: 2,
                video: 1
            }
        );
    }

    #[test]
    fn paging_tracks_offsets() {
        let first = PageVm::new(0, 10, 10);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!(first.next_skip(), 10);
        assert_eq!(first.label(), "Modules 1-10");

        let last = PageVm::new(10, 10, 2);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.previous_skip(), 0);
        assert_eq!(last.label(), "Modules 11-12");
    }

    #[test]
    fn patch_only_carries_changed_fields() {
        let original = module(ModuleKind::Text, "Body\n");
        let mut form = ModuleFormVm::from_module(&original);
        assert_eq!(form.to_patch(&original), ModulePatch::default());

        form.title = "Closures, again".into();
        let patch = form.to_patch(&original);
        assert_eq!(patch.title.as_deref(), Some("Closures, again"));
        assert!(patch.content.is_none());
        assert!(patch.kind.is_none());
    }
}
