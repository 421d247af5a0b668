//! WGSL front-end used by `compile_shader` / `link_program`.
//!
//! Compilation parses and validates one stage with naga and reflects its
//! interface. Linking checks two reflected stages against each other. Both
//! report failures as log text, never as panics.

use std::collections::BTreeMap;

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::types::{ShaderStage, UniformSlot};

/// One `@location(n)` stage input or output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceVar {
    pub name: String,
    pub location: u32,
    /// Scalar = 1, `vecN` = N.
    pub components: u32,
}

/// A `var<uniform>` global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformInfo {
    pub name: String,
    pub slot: UniformSlot,
    /// Size of the bound type in bytes.
    pub size: u32,
}

/// Reflected interface of a successfully compiled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
    pub uniforms: Vec<UniformInfo>,
}

/// Interface of a linked vertex/fragment pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedInterface {
    /// Vertex stage inputs, sorted by location.
    pub attributes: Vec<InterfaceVar>,
    /// Uniforms of both stages, deduplicated, sorted by slot.
    pub uniforms: Vec<UniformInfo>,
}

/// Compiles `source` as `stage`. `Err` carries the compile log.
pub fn compile(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::empty());
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let mut entries = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let entry = entries
        .next()
        .ok_or_else(|| format!("error: no @{stage} entry point"))?;
    if entries.next().is_some() {
        return Err(format!("error: more than one @{stage} entry point"));
    }

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_interface(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_interface(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    inputs.sort_by_key(|v| v.location);
    outputs.sort_by_key(|v| v.location);

    let uniforms = module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            Some(UniformInfo {
                name: var.name.clone().unwrap_or_default(),
                slot: UniformSlot {
                    group: binding.group,
                    binding: binding.binding,
                },
                size: module.types[var.ty].inner.size(module.to_ctx()),
            })
        })
        .collect();

    Ok(StageInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms,
    })
}

fn collect_interface(
    module: &naga::Module,
    name: Option<&str>,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    let inner = &module.types[ty].inner;
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            components: component_count(inner),
        }),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = inner {
                for member in members {
                    collect_interface(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn component_count(inner: &naga::TypeInner) -> u32 {
    match inner {
        naga::TypeInner::Scalar(_) => 1,
        naga::TypeInner::Vector { size, .. } => *size as u32,
        _ => 0,
    }
}

/// Links a vertex and a fragment stage. `Err` carries the link log.
pub fn link(vertex: &StageInterface, fragment: &StageInterface) -> Result<LinkedInterface, String> {
    let mut problems = Vec::new();

    if vertex.stage != ShaderStage::Vertex {
        problems.push(format!("error: expected a vertex stage, got {}", vertex.stage));
    }
    if fragment.stage != ShaderStage::Fragment {
        problems.push(format!("error: expected a fragment stage, got {}", fragment.stage));
    }

    for input in &fragment.inputs {
        match vertex.outputs.iter().find(|o| o.location == input.location) {
            None => problems.push(format!(
                "error: fragment input `{}` at location {} is not written by the vertex stage",
                input.name, input.location
            )),
            Some(output) if output.components != input.components => problems.push(format!(
                "error: location {} is {} components in the vertex stage but {} in the fragment stage",
                input.location, output.components, input.components
            )),
            Some(_) => {}
        }
    }

    let mut by_slot: BTreeMap<UniformSlot, UniformInfo> = BTreeMap::new();
    for uniform in vertex.uniforms.iter().chain(&fragment.uniforms) {
        if let Some(other) = by_slot.get(&uniform.slot) {
            if other.name != uniform.name {
                problems.push(format!(
                    "error: uniforms `{}` and `{}` share group {} binding {}",
                    other.name, uniform.name, uniform.slot.group, uniform.slot.binding
                ));
            } else if other.size != uniform.size {
                problems.push(format!(
                    "error: uniform `{}` is declared with different types across stages",
                    uniform.name
                ));
            }
            continue;
        }
        if let Some(other) = by_slot.values().find(|u| u.name == uniform.name) {
            problems.push(format!(
                "error: uniform `{}` is bound at group {} binding {} and group {} binding {}",
                uniform.name,
                other.slot.group,
                other.slot.binding,
                uniform.slot.group,
                uniform.slot.binding
            ));
            continue;
        }
        by_slot.insert(uniform.slot, uniform.clone());
    }

    if !problems.is_empty() {
        return Err(problems.join("\n"));
    }

    Ok(LinkedInterface {
        attributes: vertex.inputs.clone(),
        uniforms: by_slot.into_values().collect(),
    })
}
