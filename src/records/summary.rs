use crate::output::TableRow;
use crate::records::cell;

/// Column names of the per-category summary table
pub const SUMMARY_COLUMNS: [&str; 5] = ["name", "url", "image", "mandante", "arquitecto"];

/// One listing entry as shown on a category page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryRecord {
    /// Project name
    pub name: String,

    /// Link to the project's own page; never empty
    pub detail_url: String,

    /// Thumbnail shown on the listing
    pub image_url: Option<String>,

    /// Client (first contact role)
    pub mandante: Option<String>,

    /// Architect (second contact role)
    pub arquitecto: Option<String>,
}

impl TableRow for SummaryRecord {
    fn headers() -> Vec<&'static str> {
        SUMMARY_COLUMNS.to_vec()
    }

    fn to_row(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.detail_url.clone(),
            cell(&self.image_url),
            cell(&self.mandante),
            cell(&self.arquitecto),
        ]
    }
}
