use crate::types::{GeoPoint, SarError, SarResult};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Product descriptor with `ImageAttributes` below the root element
#[derive(Debug, Deserialize)]
pub struct ProductRoot {
    #[serde(rename = "ImageAttributes")]
    pub image_attributes: ImageAttributes,
}

#[derive(Debug, Deserialize)]
pub struct ImageAttributes {
    #[serde(rename = "GeographicInformation")]
    pub geographic_information: GeographicInformation,
}

#[derive(Debug, Deserialize)]
pub struct GeographicInformation {
    #[serde(rename = "MapProjection")]
    pub map_projection: MapProjection,
}

#[derive(Debug, Deserialize)]
pub struct MapProjection {
    #[serde(rename = "MapCorners")]
    pub map_corners: BTreeMap<String, MapCorner>,
}

#[derive(Debug, Deserialize)]
pub struct MapCorner {
    #[serde(rename = "Latitude")]
    pub latitude: XmlNumber,
    #[serde(rename = "Longitude")]
    pub longitude: XmlNumber,
}

/// Numeric element text; attributes such as `unit` are ignored
#[derive(Debug, Deserialize)]
pub struct XmlNumber {
    #[serde(rename = "$text")]
    pub value: f64,
}

/// Parser for the XML product descriptor
pub struct ProductXmlParser;

impl ProductXmlParser {
    /// Map corner names to geographic points
    pub fn parse_corners(xml_content: &str) -> SarResult<BTreeMap<String, GeoPoint>> {
        let attributes = match from_str::<ProductRoot>(xml_content) {
            Ok(root) => root.image_attributes,
            Err(nested_err) => {
                log::debug!("No nested ImageAttributes ({}), trying as root element", nested_err);
                from_str::<ImageAttributes>(xml_content).map_err(|e| {
                    SarError::XmlParsing(format!("Failed to parse map corners: {}", e))
                })?
            }
        };

        let corners: BTreeMap<String, GeoPoint> = attributes
            .geographic_information
            .map_projection
            .map_corners
            .into_iter()
            .map(|(name, corner)| {
                (name, GeoPoint::new(corner.latitude.value, corner.longitude.value))
            })
            .collect();

        if corners.is_empty() {
            return Err(SarError::Metadata("No map corners found in product XML".to_string()));
        }

        log::debug!("Parsed {} map corners", corners.len());
        Ok(corners)
    }
}

/// Read the map corners of an XML product descriptor
pub fn parse_xml_corners<P: AsRef<Path>>(path: P) -> SarResult<BTreeMap<String, GeoPoint>> {
    let xml_content = std::fs::read_to_string(path.as_ref())?;
    ProductXmlParser::parse_corners(&xml_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nested_corners() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
        <Product>
            <ProductId>E04_SAR_MRS</ProductId>
            <ImageAttributes>
                <GeographicInformation>
                    <MapProjection>
                        <MapCorners>
                            <UpperLeft>
                                <Latitude unit="deg">23.9</Latitude>
                                <Longitude unit="deg">71.8</Longitude>
                            </UpperLeft>
                            <LowerRight>
                                <Latitude>22.2</Latitude>
                                <Longitude>73.4</Longitude>
                            </LowerRight>
                        </MapCorners>
                    </MapProjection>
                </GeographicInformation>
            </ImageAttributes>
        </Product>"#;

        let corners = ProductXmlParser::parse_corners(xml).unwrap();
        assert_eq!(corners.len(), 2);
        assert_relative_eq!(corners["UpperLeft"].latitude, 23.9);
        assert_relative_eq!(corners["LowerRight"].longitude, 73.4);
    }

    #[test]
    fn test_image_attributes_as_root() {
        let xml = r#"<ImageAttributes>
            <GeographicInformation>
                <MapProjection>
                    <MapCorners>
                        <UpperRight>
                            <Latitude>24.0</Latitude>
                            <Longitude>73.3</Longitude>
                        </UpperRight>
                    </MapCorners>
                </MapProjection>
            </GeographicInformation>
        </ImageAttributes>"#;

        let corners = ProductXmlParser::parse_corners(xml).unwrap();
        assert_relative_eq!(corners["UpperRight"].latitude, 24.0);
    }

    #[test]
    fn test_missing_structure() {
        let xml = "<Product><ProductId>x</ProductId></Product>";
        let result = ProductXmlParser::parse_corners(xml);
        assert!(matches!(result, Err(SarError::XmlParsing(_))));
    }
}
