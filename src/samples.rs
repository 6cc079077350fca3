//! Sample table: the ordered (content, name) pairs a batch renders.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of work: a formula and the file stem its artifacts are written under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub name: String,
    pub content: String,
}

impl Sample {
    pub fn new(content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read sample table `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse sample table `{path}`: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("sample table is empty")]
    Empty,
    #[error("sample #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("sample `{name}` has empty content")]
    EmptyContent { name: String },
    #[error("sample name `{name}` is not a single path component")]
    InvalidName { name: String },
}

#[derive(Debug, Deserialize)]
struct SampleFile {
    #[serde(default)]
    samples: Vec<Sample>,
}

/// Load and validate a sample table from a TOML file with `[[samples]]` entries.
pub fn load_file(path: &Path) -> Result<Vec<Sample>, SampleError> {
    let raw = fs::read_to_string(path).map_err(|source| SampleError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let file: SampleFile = toml::from_str(&raw).map_err(|source| SampleError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    validate(&file.samples)?;
    Ok(file.samples)
}

/// Resolve the table for a run: the file when one is configured, the built-in table otherwise.
pub fn resolve(path: Option<&Path>) -> Result<Vec<Sample>, SampleError> {
    match path {
        Some(path) => load_file(path),
        None => Ok(builtin()),
    }
}

/// Check the table is usable. Duplicate names are allowed; later samples overwrite earlier artifacts.
pub fn validate(samples: &[Sample]) -> Result<(), SampleError> {
    if samples.is_empty() {
        return Err(SampleError::Empty);
    }

    for (index, sample) in samples.iter().enumerate() {
        if sample.name.is_empty() {
            return Err(SampleError::EmptyName { index });
        }
        if !is_path_component(&sample.name) {
            return Err(SampleError::InvalidName {
                name: sample.name.clone(),
            });
        }
        if sample.content.is_empty() {
            return Err(SampleError::EmptyContent {
                name: sample.name.clone(),
            });
        }
    }

    Ok(())
}

fn is_path_component(name: &str) -> bool {
    name != "."
        && name != ".."
        && !name.contains('\0')
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}

/// The formulas shipped as the default sample set.
pub fn builtin() -> Vec<Sample> {
    BUILTIN
        .iter()
        .map(|(content, name)| Sample::new(*content, *name))
        .collect()
}

const BUILTIN: &[(&str, &str)] = &[
    (
        r"x = \frac{-b \pm \sqrt{b^2 - 4ac}}{2a}",
        "The_Quadratic_Formula",
    ),
    (
        r"\sin(\theta + \phi) = \sin(\theta)\cos(\phi) + \sin(\phi)\cos(\theta)",
        "Double_angle_formula_for_Sine",
    ),
    (
        r"\int_D (\nabla \cdot F)\,\mathrm{d}V = \int_{\partial D} F \cdot n\,\mathrm{d}S",
        "Divergence_Theorem",
    ),
    (
        r"\sigma = \sqrt{ \frac{1}{N} \sum_{i=1}^N (x_i - \mu)^2 }",
        "Standard_Deviation",
    ),
    (
        r"f(x) = \int_{-\infty}^{\infty} \hat f(\xi) e^{2\pi i \xi x}\,\mathrm{d}\xi",
        "Fourier_Inverse",
    ),
    (
        r"\left\vert \sum_k a_kb_k \right\vert \leq \left(\sum_k a_k^2\right)^{\frac12}\left(\sum_k b_k^2\right)^{\frac12}",
        "Cauchy-Schwarz_Inequality",
    ),
    (
        r"e = \lim_{n \to \infty} \left(1 + \frac{1}{n}\right)^n",
        "Exponent",
    ),
    (
        r"\frac{1}{\pi} = \frac{2\sqrt{2}}{9801} \sum_{k=0}^\infty \frac{ (4k)! (1103+26390k) }{ (k!)^4 396^{4k} }",
        "Ramanujan's_Identity",
    ),
    (
        r"\int_{-\infty}^{\infty} \frac{\sin(x)}{x}\,\mathrm{d}x = \int_{-\infty}^{\infty}\frac{\sin^2(x)}{x^2}\,\mathrm{d}x",
        "A_surprising_identity",
    ),
    (
        r"\frac{1}{\left(\sqrt{\phi\sqrt5} - \phi\right) e^{\frac{2}{5}\pi}} = 1 + \frac{e^{-2\pi}}{1 + \frac{e^{-4\pi}}{1 + \frac{e^{-6\pi}}{1 + \frac{e^{-8\pi}}{1 + \cdots}}}}",
        "Another_gem_from_Ramanujan",
    ),
    (
        r"f^{(n)}(z) = \frac{n!}{2\pi i} \oint \frac{f(\xi)}{(\xi - z)^{n+1}}\,\mathrm{d}\xi",
        "Another_gem_from_Cauchy",
    ),
    (
        r"x^{x^{x^x_x}_{x^x_x}}_{x^{x^x_x}_{x^x_x}}",
        "An_unneccesary_number_of_scripts",
    ),
    (
        r"\mathop{\overbrace{c_4x^4 + c_3x^3 + c_2x^2 + c_1x + c_0}}\limits^{\gray{\mathrm{Quartic}}}",
        "Quartic_Function",
    ),
    (r"3^3 + 4^4 + 3^3 + 5^5 = 3435", "Another_fun_identity"),
];
