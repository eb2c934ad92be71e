use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SectionId {
    ClusterOverview,
    Workers,
    Executors,
    ActiveStages,
    RecentStages,
    Applications,
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionId::ClusterOverview => write!(f, "Cluster Overview"),
            SectionId::Workers => write!(f, "Workers"),
            SectionId::Executors => write!(f, "Executors"),
            SectionId::ActiveStages => write!(f, "Active Stages"),
            SectionId::RecentStages => write!(f, "Recent Stages"),
            SectionId::Applications => write!(f, "Applications"),
        }
    }
}

pub struct SectionLayout {
    pub id: SectionId,
    pub title: String,
    pub collapsed: bool,
}

impl SectionLayout {
    pub fn new(id: SectionId) -> Self {
        Self {
            title: id.to_string(),
            id,
            collapsed: false,
        }
    }

    pub fn collapsed(mut self) -> Self {
        self.collapsed = true;
        self
    }
}

pub struct Layout {
    pub sections: Vec<SectionLayout>,
}

impl Layout {
    /// Default section ordering for the dashboard.
    pub fn default_layout() -> Self {
        Self {
            sections: vec![
                SectionLayout::new(SectionId::ClusterOverview),
                SectionLayout::new(SectionId::Workers),
                SectionLayout::new(SectionId::Executors),
                SectionLayout::new(SectionId::ActiveStages),
                SectionLayout::new(SectionId::RecentStages).collapsed(),
                SectionLayout::new(SectionId::Applications).collapsed(),
            ],
        }
    }

    pub fn toggle_section(&mut self, id: SectionId) {
        if let Some(s) = self.sections.iter_mut().find(|s| s.id == id) {
            s.collapsed = !s.collapsed;
        }
    }

    pub fn is_collapsed(&self, id: SectionId) -> bool {
        self.sections.iter().find(|s| s.id == id).map(|s| s.collapsed).unwrap_or(false)
    }
}
