use std::fmt;

/// Location of a configuration object or collection, relative to the API root.
///
/// Segments are kept unescaped; the HTTP layer percent-encodes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath {
    segments: Vec<String>,
}

impl ObjectPath {
    pub fn collection(name: &str) -> Self {
        ObjectPath {
            segments: vec![name.to_string()],
        }
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        ObjectPath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The enclosing collection, or `None` for a top-level collection.
    pub fn parent(&self) -> Option<ObjectPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(ObjectPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths() {
        let path = ObjectPath::collection("delegated-admin-rights")
            .join("rights1")
            .join("delegated-admin-resource-rights")
            .join("users");
        assert_eq!(
            path.to_string(),
            "/delegated-admin-rights/rights1/delegated-admin-resource-rights/users"
        );
        assert_eq!(
            path.parent().unwrap().to_string(),
            "/delegated-admin-rights/rights1/delegated-admin-resource-rights"
        );
        assert_eq!(ObjectPath::collection("certificate-mappers").parent(), None);
    }
}
