use std::path::Path;
use std::str::FromStr;
use roxmltree::{Document, Node};
use crate::error::errors::CascadeError;
use crate::pipeline::cascade::integral::IntegralImages;

const THRESHOLD_EPS: f64 = 1e-5;
const MIN_WINDOW_STDDEV: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HaarFeature {
    pub rects: Vec<WeightedRect>,
}

impl HaarFeature {
    fn value(&self, integrals: &IntegralImages, x: u32, y: u32) -> f64 {
        self.rects
            .iter()
            .map(|r| r.weight * integrals.rect_sum(x + r.x, y + r.y, r.width, r.height) as f64)
            .sum()
    }
}

/// Split node of a boosted decision tree. Child indices `<= 0` address `-index` in the leaf table.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNode {
    pub left: i32,
    pub right: i32,
    pub feature: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeakClassifier {
    pub nodes: Vec<DecisionNode>,
    pub leaves: Vec<f64>,
}

impl WeakClassifier {
    fn predict(&self, feature_value: impl Fn(usize) -> f64) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            let next = if feature_value(node.feature) < node.threshold {
                node.left
            } else {
                node.right
            };
            if next <= 0 {
                return self.leaves[next.unsigned_abs() as usize];
            }
            idx = next as usize;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    pub threshold: f64,
    pub classifiers: Vec<WeakClassifier>,
}

/// Boosted Haar cascade in the layout written by OpenCV's `opencv_traincascade`.
#[derive(Debug, Clone, PartialEq)]
pub struct HaarCascade {
    window_width: u32,
    window_height: u32,
    stages: Vec<Stage>,
    features: Vec<HaarFeature>,
}

impl HaarCascade {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CascadeError> {
        let xml = std::fs::read_to_string(path)?;
        Self::from_xml(&xml)
    }

    pub fn from_xml(xml: &str) -> Result<Self, CascadeError> {
        let doc = Document::parse(xml)?;

        if doc.descendants().any(|n| n.attribute("type_id") == Some("opencv-haar-classifier")) {
            return Err(CascadeError::Unsupported("legacy haar classifier layout".to_string()));
        }

        let cascade = doc
            .descendants()
            .find(|n| n.has_tag_name("cascade"))
            .ok_or_else(|| CascadeError::MissingElement("cascade".to_string()))?;

        let stage_type = child_text(cascade, "stageType")?;
        if stage_type.trim() != "BOOST" {
            return Err(CascadeError::Unsupported(format!("stage type {}", stage_type.trim())));
        }
        let feature_type = child_text(cascade, "featureType")?;
        if feature_type.trim() != "HAAR" {
            return Err(CascadeError::Unsupported(format!("feature type {}", feature_type.trim())));
        }

        let window_width: u32 = parse_value(cascade, "width")?;
        let window_height: u32 = parse_value(cascade, "height")?;
        if window_width < 3 || window_height < 3 {
            return Err(CascadeError::Inconsistent(format!(
                "window {window_width}x{window_height} is too small"
            )));
        }

        let mut stages = Vec::new();
        for stage_node in list_items(child(cascade, "stages")?) {
            let threshold: f64 = parse_value(stage_node, "stageThreshold")?;
            let mut classifiers = Vec::new();
            for classifier_node in list_items(child(stage_node, "weakClassifiers")?) {
                classifiers.push(parse_weak_classifier(classifier_node)?);
            }
            stages.push(Stage { threshold, classifiers });
        }

        let mut features = Vec::new();
        for feature_node in list_items(child(cascade, "features")?) {
            features.push(parse_feature(feature_node)?);
        }

        let cascade = HaarCascade {
            window_width,
            window_height,
            stages,
            features,
        };
        cascade.validate()?;

        Ok(cascade)
    }

    fn validate(&self) -> Result<(), CascadeError> {
        if self.stages.is_empty() {
            return Err(CascadeError::Inconsistent("cascade has no stages".to_string()));
        }

        for (feature_idx, feature) in self.features.iter().enumerate() {
            for rect in &feature.rects {
                if rect.x + rect.width > self.window_width || rect.y + rect.height > self.window_height {
                    return Err(CascadeError::Inconsistent(format!(
                        "feature {feature_idx} has a rectangle outside the detection window"
                    )));
                }
            }
        }

        for (stage_idx, stage) in self.stages.iter().enumerate() {
            for classifier in &stage.classifiers {
                for (node_idx, node) in classifier.nodes.iter().enumerate() {
                    if node.feature >= self.features.len() {
                        return Err(CascadeError::Inconsistent(format!(
                            "stage {stage_idx} references missing feature {}",
                            node.feature
                        )));
                    }
                    for child in [node.left, node.right] {
                        let valid = if child <= 0 {
                            (child.unsigned_abs() as usize) < classifier.leaves.len()
                        } else {
                            child as usize > node_idx && (child as usize) < classifier.nodes.len()
                        };
                        if !valid {
                            return Err(CascadeError::Inconsistent(format!(
                                "stage {stage_idx} has a tree node with invalid child {child}"
                            )));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Run every stage on the window whose top-left corner is `(x, y)`.
    ///
    /// The window must lie inside the image the integrals were built from.
    pub fn evaluate(&self, integrals: &IntegralImages, x: u32, y: u32) -> bool {
        // Variance normalization over the window inset by one pixel.
        let (norm_w, norm_h) = (self.window_width - 2, self.window_height - 2);
        let area = (norm_w * norm_h) as f64;
        let sum = integrals.rect_sum(x + 1, y + 1, norm_w, norm_h) as f64;
        let squared_sum = integrals.rect_squared_sum(x + 1, y + 1, norm_w, norm_h) as f64;

        // Near-flat windows (standard deviation at or under MIN_WINDOW_STDDEV) never reach the stages.
        let variance = area * squared_sum - sum * sum;
        if variance <= 0.0 {
            return false;
        }
        let norm_factor = variance.sqrt();
        if area / norm_factor >= 1.0 / MIN_WINDOW_STDDEV {
            return false;
        }

        for stage in &self.stages {
            let stage_sum: f64 = stage
                .classifiers
                .iter()
                .map(|classifier| {
                    classifier.predict(|feature_idx| self.features[feature_idx].value(integrals, x, y) / norm_factor)
                })
                .sum();

            if stage_sum < stage.threshold - THRESHOLD_EPS {
                return false;
            }
        }

        true
    }
}

fn list_items<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element() && n.has_tag_name("_"))
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Result<Node<'a, 'input>, CascadeError> {
    node.children()
        .find(|n| n.is_element() && n.has_tag_name(name))
        .ok_or_else(|| CascadeError::MissingElement(name.to_string()))
}

fn node_text(node: Node) -> String {
    node.children().filter(|n| n.is_text()).filter_map(|n| n.text()).collect()
}

fn child_text(node: Node, name: &str) -> Result<String, CascadeError> {
    Ok(node_text(child(node, name)?))
}

fn parse_token<T: FromStr>(element: &str, token: &str) -> Result<T, CascadeError> {
    token.parse::<T>().map_err(|_| CascadeError::InvalidValue {
        element: element.to_string(),
        value: token.to_string(),
    })
}

fn parse_value<T: FromStr>(node: Node, name: &str) -> Result<T, CascadeError> {
    let text = child_text(node, name)?;
    parse_token(name, text.trim())
}

fn parse_weak_classifier(node: Node) -> Result<WeakClassifier, CascadeError> {
    let internal_nodes = child_text(node, "internalNodes")?;
    let tokens: Vec<&str> = internal_nodes.split_whitespace().collect();
    if tokens.is_empty() || tokens.len() % 4 != 0 {
        return Err(CascadeError::InvalidValue {
            element: "internalNodes".to_string(),
            value: internal_nodes.trim().to_string(),
        });
    }

    let mut nodes = Vec::with_capacity(tokens.len() / 4);
    for chunk in tokens.chunks(4) {
        let feature: i64 = parse_token("internalNodes", chunk[2])?;
        if feature < 0 {
            return Err(CascadeError::InvalidValue {
                element: "internalNodes".to_string(),
                value: chunk[2].to_string(),
            });
        }
        nodes.push(DecisionNode {
            left: parse_token("internalNodes", chunk[0])?,
            right: parse_token("internalNodes", chunk[1])?,
            feature: feature as usize,
            threshold: parse_token("internalNodes", chunk[3])?,
        });
    }

    let leaves = child_text(node, "leafValues")?
        .split_whitespace()
        .map(|token| parse_token::<f64>("leafValues", token))
        .collect::<Result<Vec<f64>, CascadeError>>()?;

    Ok(WeakClassifier { nodes, leaves })
}

fn parse_feature(node: Node) -> Result<HaarFeature, CascadeError> {
    if let Ok(tilted) = child_text(node, "tilted") {
        if tilted.trim() != "0" {
            return Err(CascadeError::Unsupported("tilted haar features".to_string()));
        }
    }

    let mut rects = Vec::new();
    for rect_node in list_items(child(node, "rects")?) {
        let text = node_text(rect_node);
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(CascadeError::InvalidValue {
                element: "rects".to_string(),
                value: text.trim().to_string(),
            });
        }
        rects.push(WeightedRect {
            x: parse_token("rects", tokens[0])?,
            y: parse_token("rects", tokens[1])?,
            width: parse_token("rects", tokens[2])?,
            height: parse_token("rects", tokens[3])?,
            weight: parse_token("rects", tokens[4])?,
        });
    }

    if rects.is_empty() {
        return Err(CascadeError::MissingElement("rects".to_string()));
    }

    Ok(HaarFeature { rects })
}
