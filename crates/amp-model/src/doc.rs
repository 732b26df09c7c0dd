//! Boundary document types and the model loader.
//!
//! The raw document mirrors the serialized description produced by an
//! external parser: positionally aligned kinematics lists, nested-list
//! topologies, per-chain vertex and propagator dictionaries whose shape
//! depends on their `type` tag. `load_model` converts it once into the
//! strongly typed, immutable [`ModelDefinition`], rejecting every structural
//! fault before any amplitude is built.

use std::collections::BTreeMap;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use amp_core::errors::{AmpError, ErrorInfo};
use amp_core::serde::to_canonical_json_bytes;
use amp_core::{parse_half_integer, Kinematics, Spin};
use amp_topo::{node_key_from_value, NodeKey, Topology};

use crate::recoupling::Recoupling;

/// The four positionally aligned kinematics lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KinematicsDoc {
    pub names: Vec<String>,
    pub indices: Vec<u32>,
    pub masses: Vec<f64>,
    pub spins: Vec<String>,
}

/// One vertex entry as written in the document. Fields beyond `node` and
/// `type` are scheme specific and decoded after dispatch on the tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexDoc {
    pub node: Value,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Value,
}

/// One propagator entry as written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagatorDoc {
    pub node: Value,
    #[serde(rename = "type")]
    pub kind: String,
    pub spin: String,
    pub parametrization: String,
}

/// One decay chain as written in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDoc {
    pub topology: Value,
    pub vertices: Vec<VertexDoc>,
    pub propagators: Vec<PropagatorDoc>,
    /// Complex weight as `[re, im]`.
    pub weight: [f64; 2],
}

/// A named lineshape parametrization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDoc {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Value,
}

/// One expected-intensity record at a named parameter point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecksumDoc {
    pub point: String,
    pub value: f64,
}

/// The raw model document, exactly as handed over the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDocument {
    pub kinematics: KinematicsDoc,
    pub reference_topology: Value,
    pub chains: Vec<ChainDoc>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDoc>,
    #[serde(default)]
    pub parameter_points: BTreeMap<String, BTreeMap<String, f64>>,
    #[serde(default)]
    pub checksums: BTreeMap<String, ChecksumDoc>,
}

/// A validated vertex: its split key and decoded recoupling scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexDefinition {
    pub node: NodeKey,
    pub recoupling: Recoupling,
}

/// A validated propagator.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagatorDefinition {
    pub node: NodeKey,
    pub spin: Spin,
    pub kind: String,
    pub parametrization: String,
}

/// A validated decay chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainDefinition {
    pub topology: Topology,
    pub vertices: Vec<VertexDefinition>,
    pub propagators: Vec<PropagatorDefinition>,
    pub weight: Complex64,
}

impl ChainDefinition {
    /// Vertex sitting at the split with the given key.
    pub fn vertex(&self, key: &NodeKey) -> Option<&VertexDefinition> {
        self.vertices.iter().find(|vertex| &vertex.node == key)
    }

    /// Propagator sitting at the split with the given key.
    pub fn propagator(&self, key: &NodeKey) -> Option<&PropagatorDefinition> {
        self.propagators
            .iter()
            .find(|propagator| &propagator.node == key)
    }
}

/// The fully validated, immutable model definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub kinematics: Kinematics,
    pub reference_topology: Topology,
    pub chains: Vec<ChainDefinition>,
    pub functions: BTreeMap<String, FunctionDoc>,
    pub parameter_points: BTreeMap<String, BTreeMap<String, f64>>,
    pub checksums: BTreeMap<String, ChecksumDoc>,
    /// SHA-256 of the canonical JSON of the source document.
    pub fingerprint: String,
}

fn document_error(info: ErrorInfo) -> AmpError {
    AmpError::Document(info)
}

#[derive(Deserialize)]
struct HelicityFields {
    helicities: [String; 2],
}

#[derive(Deserialize)]
struct ParityFields {
    helicities: [String; 2],
    parity_factor: i32,
}

#[derive(Deserialize)]
struct LsFields {
    l: String,
    s: String,
}

fn decode_fields<T: serde::de::DeserializeOwned>(
    fields: &Value,
    chain_index: usize,
    node: &NodeKey,
) -> Result<T, AmpError> {
    serde_json::from_value(fields.clone()).map_err(|err| {
        AmpError::Recoupling(
            ErrorInfo::new("vertex-fields", "malformed vertex coupling parameters")
                .with_context("chain", chain_index.to_string())
                .with_context("node", node.to_string())
                .with_hint(err.to_string()),
        )
    })
}

fn parse_recoupling(
    vertex: &VertexDoc,
    node: &NodeKey,
    chain_index: usize,
) -> Result<Recoupling, AmpError> {
    match vertex.kind.as_str() {
        "NoRecoupling" => {
            let fields: HelicityFields = decode_fields(&vertex.fields, chain_index, node)?;
            Ok(Recoupling::NoRecoupling {
                two_lambda_a: parse_half_integer(&fields.helicities[0])?,
                two_lambda_b: parse_half_integer(&fields.helicities[1])?,
            })
        }
        "ParityRecoupling" => {
            let fields: ParityFields = decode_fields(&vertex.fields, chain_index, node)?;
            if fields.parity_factor != 1 && fields.parity_factor != -1 {
                return Err(AmpError::Recoupling(
                    ErrorInfo::new("parity-factor", "parity factor must be +1 or -1")
                        .with_context("chain", chain_index.to_string())
                        .with_context("node", node.to_string())
                        .with_context("value", fields.parity_factor.to_string()),
                ));
            }
            Ok(Recoupling::ParityRecoupling {
                two_lambda_a: parse_half_integer(&fields.helicities[0])?,
                two_lambda_b: parse_half_integer(&fields.helicities[1])?,
                parity_factor: f64::from(fields.parity_factor),
            })
        }
        "RecouplingLS" => {
            let fields: LsFields = decode_fields(&vertex.fields, chain_index, node)?;
            let two_l = parse_half_integer(&fields.l)?;
            let two_s = parse_half_integer(&fields.s)?;
            if two_l < 0 || two_l % 2 != 0 {
                return Err(AmpError::Recoupling(
                    ErrorInfo::new(
                        "ls-orbital-integer",
                        "orbital angular momentum must be a non-negative integer",
                    )
                    .with_context("chain", chain_index.to_string())
                    .with_context("node", node.to_string())
                    .with_context("l", fields.l.clone()),
                ));
            }
            if two_s < 0 {
                return Err(AmpError::Recoupling(
                    ErrorInfo::new("ls-spin-negative", "total spin must be non-negative")
                        .with_context("chain", chain_index.to_string())
                        .with_context("node", node.to_string())
                        .with_context("s", fields.s.clone()),
                ));
            }
            Ok(Recoupling::RecouplingLS { two_l, two_s })
        }
        other => Err(AmpError::Recoupling(
            ErrorInfo::new("unknown-recoupling", "vertex coupling type is not recognized")
                .with_context("chain", chain_index.to_string())
                .with_context("node", node.to_string())
                .with_context("type", other.to_string())
                .with_hint("supported types: NoRecoupling, ParityRecoupling, RecouplingLS"),
        )),
    }
}

fn load_chain(
    chain: &ChainDoc,
    chain_index: usize,
    reference: &Topology,
    functions: &BTreeMap<String, FunctionDoc>,
) -> Result<ChainDefinition, AmpError> {
    let topology = Topology::parse(&chain.topology)?;
    if topology.span() != reference.span() {
        return Err(document_error(
            ErrorInfo::new(
                "chain-span-mismatch",
                "chain topology spans a different final state than the reference",
            )
            .with_context("chain", chain_index.to_string())
            .with_context("chain_span", topology.span().to_string())
            .with_context("reference_span", reference.span().to_string()),
        ));
    }

    let mut vertices = Vec::with_capacity(chain.vertices.len());
    for vertex in &chain.vertices {
        let node = node_key_from_value(&vertex.node)?;
        if topology.split(&node).is_none() {
            return Err(document_error(
                ErrorInfo::new("vertex-node-unknown", "vertex node is not a split of the chain")
                    .with_context("chain", chain_index.to_string())
                    .with_context("node", node.to_string()),
            ));
        }
        if vertices.iter().any(|existing: &VertexDefinition| existing.node == node) {
            return Err(document_error(
                ErrorInfo::new("vertex-node-duplicate", "two vertices share one split")
                    .with_context("chain", chain_index.to_string())
                    .with_context("node", node.to_string()),
            ));
        }
        let recoupling = parse_recoupling(vertex, &node, chain_index)?;
        vertices.push(VertexDefinition { node, recoupling });
    }
    for split in topology.internal_nodes() {
        if !vertices.iter().any(|vertex| vertex.node == split.key) {
            return Err(document_error(
                ErrorInfo::new("vertex-missing", "internal split has no vertex")
                    .with_context("chain", chain_index.to_string())
                    .with_context("node", split.key.to_string()),
            ));
        }
    }

    let mut propagators = Vec::with_capacity(chain.propagators.len());
    for propagator in &chain.propagators {
        let node = node_key_from_value(&propagator.node)?;
        let propagated = topology
            .decay_nodes()
            .iter()
            .any(|split| split.key == node);
        if !propagated {
            return Err(document_error(
                ErrorInfo::new(
                    "propagator-node-unknown",
                    "propagator node is not a propagated split of the chain",
                )
                .with_context("chain", chain_index.to_string())
                .with_context("node", node.to_string()),
            ));
        }
        if propagators
            .iter()
            .any(|existing: &PropagatorDefinition| existing.node == node)
        {
            return Err(document_error(
                ErrorInfo::new("propagator-node-duplicate", "two propagators share one split")
                    .with_context("chain", chain_index.to_string())
                    .with_context("node", node.to_string()),
            ));
        }
        let function = functions.get(&propagator.parametrization).ok_or_else(|| {
            document_error(
                ErrorInfo::new(
                    "unknown-parametrization",
                    "propagator references an undefined parametrization",
                )
                .with_context("chain", chain_index.to_string())
                .with_context("node", node.to_string())
                .with_context("parametrization", propagator.parametrization.clone()),
            )
        })?;
        if function.kind != propagator.kind {
            return Err(document_error(
                ErrorInfo::new(
                    "parametrization-kind-mismatch",
                    "propagator type disagrees with its parametrization",
                )
                .with_context("chain", chain_index.to_string())
                .with_context("node", node.to_string())
                .with_context("propagator_type", propagator.kind.clone())
                .with_context("function_type", function.kind.clone()),
            ));
        }
        propagators.push(PropagatorDefinition {
            node,
            spin: Spin::parse(&propagator.spin)?,
            kind: propagator.kind.clone(),
            parametrization: propagator.parametrization.clone(),
        });
    }
    for split in topology.decay_nodes() {
        if !propagators.iter().any(|propagator| propagator.node == split.key) {
            return Err(document_error(
                ErrorInfo::new("propagator-missing", "propagated split has no propagator")
                    .with_context("chain", chain_index.to_string())
                    .with_context("node", split.key.to_string()),
            ));
        }
    }

    Ok(ChainDefinition {
        topology,
        vertices,
        propagators,
        weight: Complex64::new(chain.weight[0], chain.weight[1]),
    })
}

/// Validates the raw document and produces the immutable model definition.
pub fn load_model(document: &ModelDocument) -> Result<ModelDefinition, AmpError> {
    let kinematics = Kinematics::from_lists(
        &document.kinematics.names,
        &document.kinematics.indices,
        &document.kinematics.masses,
        &document.kinematics.spins,
    )?;
    let reference_topology = Topology::parse(&document.reference_topology)?;
    if reference_topology.leaves().len() != kinematics.final_count() {
        return Err(document_error(
            ErrorInfo::new(
                "topology-kinematics-mismatch",
                "reference topology and kinematics disagree on the final-state count",
            )
            .with_context("leaves", reference_topology.leaves().len().to_string())
            .with_context("particles", kinematics.final_count().to_string()),
        ));
    }
    if document.chains.is_empty() {
        return Err(document_error(ErrorInfo::new(
            "no-chains",
            "a model needs at least one decay chain",
        )));
    }
    let mut chains = Vec::with_capacity(document.chains.len());
    for (chain_index, chain) in document.chains.iter().enumerate() {
        chains.push(load_chain(
            chain,
            chain_index,
            &reference_topology,
            &document.functions,
        )?);
    }

    let bytes = to_canonical_json_bytes(document)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let fingerprint = format!("{:x}", hasher.finalize());

    Ok(ModelDefinition {
        kinematics,
        reference_topology,
        chains,
        functions: document.functions.clone(),
        parameter_points: document.parameter_points.clone(),
        checksums: document.checksums.clone(),
        fingerprint,
    })
}
