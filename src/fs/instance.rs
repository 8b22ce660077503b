use std::path::Path;

use crate::error::Error;

/// A dense multicut problem instance: `nr_nodes` feature rows of `dim`
/// f32 coordinates, stored row-major.
#[derive(Debug, Clone)]
pub struct Instance {
    pub features: Vec<f32>,
    pub nr_nodes: usize,
    pub dim: usize,
}

impl Instance {
    /// Loads an instance, picking the format by file extension: `.npy`
    /// parses as a 2-D float32 NumPy array, everything else as the
    /// whitespace text format.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if path.extension().is_some_and(|ext| ext == "npy") {
            Self::from_npy(path)
        } else {
            Self::from_text(path)
        }
    }

    /// Reads the whitespace text format: two counts, then the features.
    pub fn from_text(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse_text(&content)
    }

    /// Parses the text format from an in-memory string.
    pub fn parse_text(content: &str) -> Result<Self, Error> {
        let mut tokens = content.split_whitespace();

        let nr_nodes: usize = tokens
            .next()
            .ok_or_else(|| Error::Malformed("missing node count".into()))?
            .parse()
            .map_err(|_| Error::Malformed("node count is not an integer".into()))?;
        let dim: usize = tokens
            .next()
            .ok_or_else(|| Error::Malformed("missing feature dimension".into()))?
            .parse()
            .map_err(|_| Error::Malformed("feature dimension is not an integer".into()))?;

        let mut features = Vec::with_capacity(nr_nodes * dim);
        for token in tokens {
            let value: f32 = token
                .parse()
                .map_err(|_| Error::Malformed(format!("'{token}' is not a float")))?;
            features.push(value);
        }

        if features.len() != nr_nodes * dim {
            return Err(Error::Malformed(format!(
                "expected {} feature values for {} nodes of dimension {}, found {}",
                nr_nodes * dim,
                nr_nodes,
                dim,
                features.len()
            )));
        }

        Ok(Instance {
            features,
            nr_nodes,
            dim,
        })
    }

    /// Reads a 2-D float32 `.npy` file; rows are nodes, columns are
    /// feature dimensions.
    pub fn from_npy(path: &Path) -> Result<Self, Error> {
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        let npy = npyz::NpyFile::new(&bytes[..])
            .map_err(|e| Error::Malformed(format!("not a readable npy file: {e}")))?;

        let shape = npy.shape().to_vec();
        if shape.len() != 2 {
            return Err(Error::Malformed(format!(
                "expected a 2-D feature array, got {} dimension(s)",
                shape.len()
            )));
        }
        let (nr_nodes, dim) = (shape[0] as usize, shape[1] as usize);

        let data = npy
            .data::<f32>()
            .map_err(|e| Error::Malformed(format!("npy payload is not f32: {e}")))?;
        let features: Vec<f32> = data
            .collect::<Result<_, _>>()
            .map_err(|e| Error::Malformed(format!("truncated npy payload: {e}")))?;

        if features.len() != nr_nodes * dim {
            return Err(Error::Malformed(format!(
                "npy payload holds {} values, header promises {}",
                features.len(),
                nr_nodes * dim
            )));
        }

        Ok(Instance {
            features,
            nr_nodes,
            dim,
        })
    }
}
