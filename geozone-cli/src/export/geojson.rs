//! Export des zones vers GeoJSON avec geozero

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::Geometry;
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use geozone::{MapSurface, Session, Zone, ZoneStyle};

/// Les coordonnées de zone sont en WGS84
const EPSG_WGS84: u32 = 4326;

/// Exporte les zones d'une session en GeoJSON
pub fn export_to_geojson<S: MapSurface>(session: &Session<S>, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    write_feature_collection(&mut writer, session)?;
    writer.flush()?;

    Ok(())
}

/// Écrit une FeatureCollection: une feature par zone, style courant inclus
pub fn write_feature_collection<W: Write, S: MapSurface>(
    writer: &mut W,
    session: &Session<S>,
) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"features":["#,
        EPSG_WGS84
    )?;

    for (i, zone) in session.list_zones().into_iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, zone, session.style_of(zone))?;
    }

    write!(writer, "]}}")?;
    Ok(())
}

/// Écrit une zone en GeoJSON
fn write_feature<W: Write>(writer: &mut W, zone: &Zone, style: &ZoneStyle) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","id":{},"#, zone.id)?;

    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    Geometry::Polygon(zone.bounds.to_polygon()).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(
        writer,
        r#","properties":{{"name":"{}","zone_type":"{}","active":{}"#,
        escape_json(&zone.name),
        zone.zone_type,
        zone.active
    )?;
    if !zone.members.is_empty() {
        let members: Vec<String> = zone.members.iter().map(|m| m.to_string()).collect();
        write!(writer, r#","members":[{}]"#, members.join(","))?;
    }
    write!(
        writer,
        r#","stroke":"{}","stroke-width":{},"fill":{}}}}}"#,
        escape_json(&style.stroke_color),
        style.stroke_weight,
        style.fill
    )?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geozone::{GeoPoint, RecordingSurface, SurfaceEvent, ZoneType};

    fn session_with_zone() -> Session<RecordingSurface> {
        let mut session = Session::new(RecordingSurface::new());
        session.start_creation();
        session
            .handle_event(SurfaceEvent::PointerDown(GeoPoint::new(51.5, -0.1)))
            .unwrap();
        session
            .handle_event(SurfaceEvent::PointerUp(GeoPoint::new(51.51, -0.08)))
            .unwrap();
        let id = session.selected_id().unwrap();
        session.save_edit(id, "Quai \"Est\"", ZoneType::Rain).unwrap();
        session
    }

    #[test]
    fn test_write_feature_collection() {
        let session = session_with_zone();

        let mut buffer = Vec::new();
        write_feature_collection(&mut buffer, &session).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["geometry"]["type"], "Polygon");
        assert_eq!(feature["properties"]["name"], "Quai \"Est\"");
        assert_eq!(feature["properties"]["zone_type"], "rain");
        // la zone validée reste sélectionnée
        assert_eq!(feature["properties"]["stroke"], "red");

        let ring = feature["geometry"]["coordinates"][0].as_array().unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
        assert_eq!(ring[0][0].as_f64().unwrap(), -0.1);
        assert_eq!(ring[0][1].as_f64().unwrap(), 51.5);
    }

    #[test]
    fn test_escape_json() {
        assert_eq!(escape_json("hello"), "hello");
        assert_eq!(escape_json("hello\"world"), "hello\\\"world");
        assert_eq!(escape_json("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_export_to_geojson() {
        let session = session_with_zone();
        let output_path = std::env::temp_dir().join("test_geozone_export.geojson");

        export_to_geojson(&session, &output_path).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains(r#""type":"FeatureCollection""#));
        assert!(content.contains("EPSG::4326"));
        assert!(content.contains(r#""id":1"#));

        std::fs::remove_file(output_path).ok();
    }
}
