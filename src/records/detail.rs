use crate::output::TableRow;
use crate::records::cell;

/// Column names of the per-category detail table
pub const DETAIL_COLUMNS: [&str; 18] = [
    "project_name",
    "project_image_url",
    "project_entry_date",
    "mandante",
    "arquitecto",
    "unidad_tecnica",
    "asesor",
    "entidad_evaluadora",
    "region",
    "comuna",
    "version_certificacion",
    "nivel_obtenido",
    "fecha_logro_obtenido",
    "puntaje_obtenido",
    "asesor_precertificacion",
    "entidad_evaluadora_precertificacion",
    "asesor_certificacion",
    "entidad_evaluadora_certificacion",
];

/// Named attributes listed on a project page
///
/// Variant order is the column order of the detail table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Mandante,
    Arquitecto,
    UnidadTecnica,
    Asesor,
    EntidadEvaluadora,
    Region,
    Comuna,
    VersionCertificacion,
    NivelObtenido,
    FechaLogroObtenido,
    PuntajeObtenido,
    AsesorPrecertificacion,
    EntidadEvaluadoraPrecertificacion,
    AsesorCertificacion,
    EntidadEvaluadoraCertificacion,
}

impl Attribute {
    /// Number of attributes carried by every detail record
    pub const COUNT: usize = 15;

    /// All attributes in column order
    pub const ALL: [Attribute; Attribute::COUNT] = [
        Self::Mandante,
        Self::Arquitecto,
        Self::UnidadTecnica,
        Self::Asesor,
        Self::EntidadEvaluadora,
        Self::Region,
        Self::Comuna,
        Self::VersionCertificacion,
        Self::NivelObtenido,
        Self::FechaLogroObtenido,
        Self::PuntajeObtenido,
        Self::AsesorPrecertificacion,
        Self::EntidadEvaluadoraPrecertificacion,
        Self::AsesorCertificacion,
        Self::EntidadEvaluadoraCertificacion,
    ];

    /// Position in the attribute array
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Output column name
    pub fn column(&self) -> &'static str {
        DETAIL_COLUMNS[3 + self.index()]
    }

    /// Page labels that denote this attribute, after label normalization
    /// (colons stripped, whitespace collapsed, accents transliterated)
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Mandante => &["Mandante"],
            Self::Arquitecto => &["Arquitecto"],
            Self::UnidadTecnica => &["Unidad tecnica", "Unidad Tecnica"],
            Self::Asesor => &["Asesor"],
            Self::EntidadEvaluadora => &["Entidad Evaluadora", "Entidad evaluadora"],
            Self::Region => &["Region"],
            Self::Comuna => &["Comuna"],
            Self::VersionCertificacion => {
                &["Version de certificacion", "Version de Certificacion"]
            }
            Self::NivelObtenido => &["Nivel obtenido", "Nivel Obtenido"],
            Self::FechaLogroObtenido => &["Fecha de logro obtenido", "Fecha de Logro Obtenido"],
            Self::PuntajeObtenido => &["Puntaje obtenido", "Puntaje Obtenido"],
            Self::AsesorPrecertificacion => &["Asesor precertificacion", "Asesor Precertificacion"],
            Self::EntidadEvaluadoraPrecertificacion => &[
                "Entidad evaluadora precertificacion",
                "Entidad Evaluadora Precertificacion",
            ],
            Self::AsesorCertificacion => &["Asesor certificacion", "Asesor Certificacion"],
            Self::EntidadEvaluadoraCertificacion => &[
                "Entidad evaluadora certificacion",
                "Entidad Evaluadora Certificacion",
            ],
        }
    }

    /// Resolves a normalized page label to its attribute
    ///
    /// Matching is exact; labels not in any synonym list return None.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|attribute| attribute.labels().contains(&label))
    }
}

/// Everything extracted from one project page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DetailRecord {
    /// Page the record was extracted from (join key to the summary record)
    pub detail_url: String,

    /// Page title
    pub name: Option<String>,

    /// Main content image, always with an https scheme
    pub image_url: Option<String>,

    /// Publication date, `YYYY-MM-DD`
    pub entry_date: Option<String>,

    attributes: [Option<String>; Attribute::COUNT],
}

impl DetailRecord {
    /// Creates a record with every attribute missing
    pub fn new(detail_url: impl Into<String>) -> Self {
        Self {
            detail_url: detail_url.into(),
            name: None,
            image_url: None,
            entry_date: None,
            attributes: Default::default(),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        self.attributes[attribute.index()].as_deref()
    }

    pub fn set(&mut self, attribute: Attribute, value: Option<String>) {
        self.attributes[attribute.index()] = value;
    }

    /// Attribute values in column order
    pub fn attributes(&self) -> &[Option<String>; Attribute::COUNT] {
        &self.attributes
    }
}

impl TableRow for DetailRecord {
    fn headers() -> Vec<&'static str> {
        DETAIL_COLUMNS.to_vec()
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(DETAIL_COLUMNS.len());
        row.push(cell(&self.name));
        row.push(cell(&self.image_url));
        row.push(cell(&self.entry_date));
        row.extend(self.attributes.iter().map(cell));
        row
    }
}
