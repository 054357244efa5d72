//! A compact StyleGAN3-style generator evaluated on the CPU with candle.
//!
//! Checkpoint layout: a directory holding `config.json` ([`FourierGeneratorConfig`]) and
//! `model.safetensors` with the tensors listed by [`expected_tensors`].
//!
//! - mapping: RMS-normalized `z`, `mapping_layers` fully connected layers with leaky ReLU.
//! - synthesis input: an affine stage turns `w` into a rotation and translation of the pixel
//!   grid, which is then encoded as Fourier features.
//! - synthesis layers: per-pixel fully connected layers modulated by per-layer styles of `w`.
//! - `torgb`: linear projection to image channels.

use std::collections::HashMap;
use std::f64::consts::{SQRT_2, TAU};
use std::path::{Path, PathBuf};

use candle_core::{D, DType, Device, Module, Tensor};
use candle_nn::{Linear, VarBuilder};
use serde::{Deserialize, Serialize};

use crate::foundation::core::Latent;
use crate::foundation::error::{WalkError, WalkResult};
use crate::network::{ChwImage, Generator};

/// Config file name inside a checkpoint directory.
pub const CONFIG_FILE: &str = "config.json";
/// Weights file name inside a checkpoint directory.
pub const WEIGHTS_FILE: &str = "model.safetensors";

const LRELU_SLOPE: f64 = 0.2;

/// Architecture hyper-parameters stored next to the weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FourierGeneratorConfig {
    /// Input latent width.
    pub z_dim: usize,
    /// Mapped latent width.
    pub w_dim: usize,
    /// Fully connected layers in the mapping network.
    pub mapping_layers: usize,
    /// Fourier feature count, also the width of every synthesis layer.
    pub feature_dim: usize,
    /// Modulated synthesis layers.
    pub synthesis_layers: usize,
    /// Output images are `resolution x resolution`.
    pub resolution: usize,
    /// Output channels (3 for RGB).
    #[serde(default = "default_img_channels")]
    pub img_channels: usize,
}

fn default_img_channels() -> usize {
    3
}

impl FourierGeneratorConfig {
    fn validate(&self) -> WalkResult<()> {
        let dims = [
            ("z_dim", self.z_dim),
            ("w_dim", self.w_dim),
            ("mapping_layers", self.mapping_layers),
            ("feature_dim", self.feature_dim),
            ("resolution", self.resolution),
            ("img_channels", self.img_channels),
        ];
        if let Some((name, _)) = dims.iter().find(|(_, v)| *v == 0) {
            return Err(WalkError::resource(format!(
                "network config field '{name}' must be non-zero"
            )));
        }
        Ok(())
    }
}

/// Tensor names and shapes a checkpoint for `cfg` must contain.
pub fn expected_tensors(cfg: &FourierGeneratorConfig) -> Vec<(String, Vec<usize>)> {
    let mut out = Vec::new();
    let mut linear = |prefix: String, in_dim: usize, out_dim: usize| {
        out.push((format!("{prefix}.weight"), vec![out_dim, in_dim]));
        out.push((format!("{prefix}.bias"), vec![out_dim]));
    };

    for i in 0..cfg.mapping_layers {
        let in_dim = if i == 0 { cfg.z_dim } else { cfg.w_dim };
        linear(format!("mapping.fc{i}"), in_dim, cfg.w_dim);
    }
    linear("synthesis.input.affine".to_string(), cfg.w_dim, 4);
    for i in 0..cfg.synthesis_layers {
        linear(
            format!("synthesis.layer{i}.affine"),
            cfg.w_dim,
            cfg.feature_dim,
        );
        linear(
            format!("synthesis.layer{i}.fc"),
            cfg.feature_dim,
            cfg.feature_dim,
        );
    }
    linear(
        "synthesis.torgb".to_string(),
        cfg.feature_dim,
        cfg.img_channels,
    );

    out.push(("mapping.w_avg".to_string(), vec![cfg.w_dim]));
    out.push(("synthesis.input.freqs".to_string(), vec![cfg.feature_dim, 2]));
    out.push(("synthesis.input.phases".to_string(), vec![cfg.feature_dim]));
    out
}

/// Resolve a checkpoint locator into `(config, weights)` paths.
///
/// A directory is expected to hold [`CONFIG_FILE`] and [`WEIGHTS_FILE`]; a `.safetensors` file
/// uses the [`CONFIG_FILE`] next to it.
pub fn resolve_checkpoint(locator: &Path) -> WalkResult<(PathBuf, PathBuf)> {
    let (config, weights) = if locator.is_dir() {
        (locator.join(CONFIG_FILE), locator.join(WEIGHTS_FILE))
    } else if locator.extension().is_some_and(|ext| ext == "safetensors") {
        let dir = locator.parent().unwrap_or_else(|| Path::new("."));
        (dir.join(CONFIG_FILE), locator.to_path_buf())
    } else {
        return Err(WalkError::resource(format!(
            "network '{}' is neither a checkpoint directory nor a .safetensors file",
            locator.display()
        )));
    };

    for path in [&config, &weights] {
        if !path.is_file() {
            return Err(WalkError::resource(format!(
                "network file '{}' not found",
                path.display()
            )));
        }
    }
    Ok((config, weights))
}

#[derive(Debug)]
struct MappingNetwork {
    layers: Vec<Linear>,
    w_avg: Tensor,
}

impl MappingNetwork {
    fn load(cfg: &FourierGeneratorConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let mut layers = Vec::with_capacity(cfg.mapping_layers);
        for i in 0..cfg.mapping_layers {
            let in_dim = if i == 0 { cfg.z_dim } else { cfg.w_dim };
            layers.push(candle_nn::linear(in_dim, cfg.w_dim, vb.pp(format!("fc{i}")))?);
        }
        let w_avg = vb.get(cfg.w_dim, "w_avg")?;
        Ok(Self { layers, w_avg })
    }

    fn forward(&self, z: &Tensor) -> candle_core::Result<Tensor> {
        let rms = z
            .sqr()?
            .mean_keepdim(D::Minus1)?
            .affine(1.0, 1e-8)?
            .sqrt()?;
        let mut x = z.broadcast_div(&rms)?;
        for layer in &self.layers {
            x = lrelu_gain(&layer.forward(&x)?)?;
        }
        Ok(x)
    }

    fn truncate(&self, w: &Tensor, psi: f64) -> candle_core::Result<Tensor> {
        let avg = self.w_avg.unsqueeze(0)?;
        w.broadcast_sub(&avg)?
            .affine(psi, 0.0)?
            .broadcast_add(&avg)
    }
}

#[derive(Debug)]
struct SynthesisInput {
    affine: Linear,
    freqs: Tensor,
    phases: Tensor,
    resolution: usize,
}

impl SynthesisInput {
    fn load(cfg: &FourierGeneratorConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(Self {
            affine: candle_nn::linear(cfg.w_dim, 4, vb.pp("affine"))?,
            freqs: vb.get((cfg.feature_dim, 2), "freqs")?,
            phases: vb.get(cfg.feature_dim, "phases")?,
            resolution: cfg.resolution,
        })
    }

    /// `[cos, sin, tx, ty]` of the grid transform selected by `w`.
    fn transform(&self, w: &Tensor) -> candle_core::Result<[f32; 4]> {
        let t = self.affine.forward(w)?.flatten_all()?.to_vec1::<f32>()?;
        let norm = (t[0] * t[0] + t[1] * t[1]).sqrt();
        let (c, s) = if norm > 1e-8 {
            (t[0] / norm, t[1] / norm)
        } else {
            (1.0, 0.0)
        };
        Ok([c, s, t[2], t[3]])
    }

    fn forward(&self, w: &Tensor) -> candle_core::Result<Tensor> {
        let [c, s, tx, ty] = self.transform(w)?;
        let n = self.resolution;
        let mut coords = Vec::with_capacity(n * n * 2);
        for row in 0..n {
            let y = (row as f32 + 0.5) / n as f32 - 0.5;
            for col in 0..n {
                let x = (col as f32 + 0.5) / n as f32 - 0.5;
                coords.push(c * x - s * y + tx);
                coords.push(s * x + c * y + ty);
            }
        }
        let coords = Tensor::from_vec(coords, (n * n, 2), self.freqs.device())?;
        coords
            .matmul(&self.freqs.t()?)?
            .broadcast_add(&self.phases.unsqueeze(0)?)?
            .affine(TAU, 0.0)?
            .sin()
    }
}

#[derive(Debug)]
struct SynthesisLayer {
    affine: Linear,
    fc: Linear,
}

impl SynthesisLayer {
    fn load(cfg: &FourierGeneratorConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        Ok(Self {
            affine: candle_nn::linear(cfg.w_dim, cfg.feature_dim, vb.pp("affine"))?,
            fc: candle_nn::linear(cfg.feature_dim, cfg.feature_dim, vb.pp("fc"))?,
        })
    }

    fn forward(&self, x: &Tensor, w: &Tensor) -> candle_core::Result<Tensor> {
        let styles = self.affine.forward(w)?;
        lrelu_gain(&self.fc.forward(&x.broadcast_mul(&styles)?)?)
    }
}

fn lrelu_gain(x: &Tensor) -> candle_core::Result<Tensor> {
    x.maximum(&x.affine(LRELU_SLOPE, 0.0)?)?
        .affine(SQRT_2, 0.0)
}

/// Generator with an affine Fourier-feature input stage; see the module docs.
#[derive(Debug)]
pub struct FourierGenerator {
    config: FourierGeneratorConfig,
    mapping: MappingNetwork,
    input: SynthesisInput,
    layers: Vec<SynthesisLayer>,
    torgb: Linear,
    device: Device,
    stabilized: bool,
}

impl FourierGenerator {
    /// Load a checkpoint directory or `.safetensors` file.
    #[tracing::instrument(skip_all, fields(network = %locator.display()))]
    pub fn load(locator: &Path) -> WalkResult<Self> {
        let (config_path, weights_path) = resolve_checkpoint(locator)?;

        let raw = std::fs::read_to_string(&config_path).map_err(|e| {
            WalkError::resource(format!(
                "failed to read network config '{}': {e}",
                config_path.display()
            ))
        })?;
        let config: FourierGeneratorConfig = serde_json::from_str(&raw).map_err(|e| {
            WalkError::resource(format!(
                "failed to parse network config '{}': {e}",
                config_path.display()
            ))
        })?;

        let device = Device::Cpu;
        let tensors = candle_core::safetensors::load(&weights_path, &device).map_err(|e| {
            WalkError::resource(format!(
                "failed to load network weights '{}': {e}",
                weights_path.display()
            ))
        })?;

        let generator = Self::from_tensors(config, tensors)?;
        tracing::info!(
            z_dim = generator.config.z_dim,
            w_dim = generator.config.w_dim,
            resolution = generator.config.resolution,
            "loaded network"
        );
        Ok(generator)
    }

    /// Build from already loaded tensors.
    pub fn from_tensors(
        config: FourierGeneratorConfig,
        tensors: HashMap<String, Tensor>,
    ) -> WalkResult<Self> {
        config.validate()?;

        let mut missing = Vec::new();
        for (name, shape) in expected_tensors(&config) {
            match tensors.get(&name) {
                None => missing.push(name),
                Some(t) if t.dims() != shape.as_slice() => {
                    return Err(WalkError::resource(format!(
                        "network tensor '{name}' has shape {:?}, expected {shape:?}",
                        t.dims()
                    )));
                }
                Some(_) => {}
            }
        }
        if !missing.is_empty() {
            return Err(WalkError::resource(format!(
                "network checkpoint is missing tensors: {missing:?}"
            )));
        }

        let device = Device::Cpu;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let build = || -> candle_core::Result<Self> {
            let synthesis = vb.pp("synthesis");
            let layers = (0..config.synthesis_layers)
                .map(|i| SynthesisLayer::load(&config, synthesis.pp(format!("layer{i}"))))
                .collect::<candle_core::Result<Vec<_>>>()?;
            Ok(Self {
                mapping: MappingNetwork::load(&config, vb.pp("mapping"))?,
                input: SynthesisInput::load(&config, synthesis.pp("input"))?,
                layers,
                torgb: candle_nn::linear(
                    config.feature_dim,
                    config.img_channels,
                    synthesis.pp("torgb"),
                )?,
                config: config.clone(),
                device: device.clone(),
                stabilized: false,
            })
        };
        build().map_err(|e| WalkError::resource(format!("failed to build network: {e}")))
    }

    /// Architecture of the loaded network.
    pub fn config(&self) -> &FourierGeneratorConfig {
        &self.config
    }

    fn row_tensor(&self, latent: &Latent, dim: usize, what: &str) -> WalkResult<Tensor> {
        if latent.dim() != dim {
            return Err(WalkError::runtime(format!(
                "{what} latent has {} values, network expects {dim}",
                latent.dim()
            )));
        }
        Ok(Tensor::from_slice(latent.as_slice(), (1, dim), &self.device)?)
    }

    /// Mapping without truncation.
    pub(crate) fn map_raw(&self, z: &Latent) -> WalkResult<Tensor> {
        let z = self.row_tensor(z, self.config.z_dim, "input")?;
        Ok(self.mapping.forward(&z)?)
    }

    pub(crate) fn input_transform(&self, w: &Latent) -> WalkResult<[f32; 4]> {
        let w = self.row_tensor(w, self.config.w_dim, "mapped")?;
        Ok(self.input.transform(&w)?)
    }
}

impl Generator for FourierGenerator {
    fn z_dim(&self) -> usize {
        self.config.z_dim
    }

    fn map(&self, z: &Latent, truncation_psi: f32) -> WalkResult<Latent> {
        let mut w = self.map_raw(z)?;
        if truncation_psi != 1.0 {
            w = self.mapping.truncate(&w, f64::from(truncation_psi))?;
        }
        Ok(Latent::from_vec(w.flatten_all()?.to_vec1::<f32>()?))
    }

    fn synthesize(&self, w: &Latent) -> WalkResult<ChwImage> {
        let w = self.row_tensor(w, self.config.w_dim, "mapped")?;
        let mut x = self.input.forward(&w)?;
        for layer in &self.layers {
            x = layer.forward(&x, &w)?;
        }
        let rgb = self.torgb.forward(&x)?.t()?.contiguous()?;
        let n = self.config.resolution;
        ChwImage::new(
            self.config.img_channels,
            n,
            n,
            rgb.flatten_all()?.to_vec1::<f32>()?,
        )
    }

    fn stabilize_input(&mut self) -> WalkResult<bool> {
        if self.stabilized {
            return Ok(true);
        }
        let w_avg = self.mapping.w_avg.unsqueeze(0)?;
        let shift = self.input.affine.forward(&w_avg)?.squeeze(0)?;
        let weight = self.input.affine.weight().zeros_like()?;
        self.input.affine = Linear::new(weight, Some(shift));
        self.stabilized = true;
        tracing::debug!("zeroed synthesis input affine weight");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/network/fourier.rs"]
mod tests;
