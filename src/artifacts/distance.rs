use std::collections::HashMap;
use std::io::Read;

/// Precomputed distances in meters from each property to named locations.
///
/// Rows are properties (the shared property index), columns are locations.
/// Missing cells mean the distance is unknown.
#[derive(Debug, Clone)]
pub struct DistanceTable {
    properties: Vec<String>,
    positions: HashMap<String, usize>,
    locations: Vec<String>,
    /// Column-major: `columns[location][property]`
    columns: Vec<Vec<Option<f64>>>,
}

fn parse_distance(raw: &str) -> Result<Option<f64>, String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    let meters: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a distance", raw))?;
    if !meters.is_finite() || meters < 0.0 {
        return Err(format!("distance {} must be finite and non-negative", meters));
    }
    Ok(Some(meters))
}

impl DistanceTable {
    /// Reads a CSV whose first column is the property name and whose other
    /// headers are location names
    pub fn from_csv<R: Read>(reader: R) -> Result<Self, String> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers().map_err(|e| e.to_string())?.clone();
        let locations: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        if locations.is_empty() {
            return Err("distance table has no location columns".to_string());
        }

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| e.to_string())?;
            let name = record.get(0).unwrap_or_default().trim().to_string();
            let cells = (0..locations.len())
                .map(|j| parse_distance(record.get(j + 1).unwrap_or_default()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| format!("row {}: {}", line + 1, e))?;
            rows.push((name, cells));
        }

        Self::from_rows(locations, rows)
    }

    /// Builds a table from `(property, distances)` rows aligned with `locations`
    pub fn from_rows(
        locations: Vec<String>,
        rows: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self, String> {
        let mut properties = Vec::with_capacity(rows.len());
        let mut positions = HashMap::with_capacity(rows.len());
        let mut columns = vec![Vec::with_capacity(rows.len()); locations.len()];

        let mut seen_locations = HashMap::new();
        for (j, location) in locations.iter().enumerate() {
            if seen_locations.insert(location.as_str(), j).is_some() {
                return Err(format!("location '{}' appears twice", location));
            }
        }

        for (name, cells) in rows {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err("a row has an empty property name".to_string());
            }
            if cells.len() != locations.len() {
                return Err(format!(
                    "property '{}' has {} distances for {} locations",
                    name,
                    cells.len(),
                    locations.len()
                ));
            }
            if positions.insert(name.clone(), properties.len()).is_some() {
                return Err(format!("property '{}' appears twice", name));
            }
            for (column, cell) in columns.iter_mut().zip(cells) {
                column.push(cell);
            }
            properties.push(name);
        }

        Ok(Self {
            properties,
            positions,
            locations,
            columns,
        })
    }

    /// The shared property index, in row order
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Row position of a property name, ignoring surrounding whitespace
    pub fn position(&self, property: &str) -> Option<usize> {
        self.positions.get(property.trim()).copied()
    }

    /// Distances for one location, aligned with [`Self::properties`].
    /// Surrounding whitespace in `location` is ignored.
    pub fn column(&self, location: &str) -> Option<&[Option<f64>]> {
        let location = location.trim();
        self.locations
            .iter()
            .position(|l| l == location)
            .map(|j| self.columns[j].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "PropertyName,Sector 14,Cyber Hub\n\
                         A ,500,1200.5\n\
                         B,2000,\n\
                         C,nan,80\n";

    #[test]
    fn test_reads_csv_with_missing_cells() {
        let table = DistanceTable::from_csv(TABLE.as_bytes()).unwrap();
        assert_eq!(table.properties(), &["A", "B", "C"]);
        assert_eq!(table.locations(), &["Sector 14", "Cyber Hub"]);
        assert_eq!(
            table.column("Sector 14").unwrap(),
            &[Some(500.0), Some(2000.0), None]
        );
        assert_eq!(table.column("Cyber Hub").unwrap()[1], None);
        assert_eq!(table.position(" A"), Some(0));
        assert!(table.column("Nowhere").is_none());
        assert!(table.column("Cyber Hub ").is_some());
    }

    #[test]
    fn test_rejects_negative_and_garbage_distances() {
        assert!(DistanceTable::from_csv("PropertyName,X\nA,-1\n".as_bytes()).is_err());
        assert!(DistanceTable::from_csv("PropertyName,X\nA,far\n".as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_duplicate_properties_after_trimming() {
        let err = DistanceTable::from_csv("PropertyName,X\nA,1\n A ,2\n".as_bytes()).unwrap_err();
        assert!(err.contains("appears twice"));
    }
}
