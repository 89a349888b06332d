//! PPO agent implemented with candle.
use super::{compute_gae, standardize, PpoConfig};
use crate::{error::AgentError, model::ActorCritic, DiscreteAct, PixelObs};
use anyhow::{ensure, Result};
use arcade_core::{
    record::{Record, RecordValue},
    rollout::{Rollout, Segment},
    Agent, Configurable, Env, Policy,
};
use candle_core::{Device, Tensor, D};
use candle_nn::ops::{log_softmax, softmax};
use log::{debug, info};
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::SmallRng,
    seq::SliceRandom,
    SeedableRng,
};
use serde::{Deserialize, Serialize};
use std::{fs, marker::PhantomData, path::Path};

const POLICY_FILE: &str = "policy.safetensors";
const LEARNER_STATE_FILE: &str = "learner_state.yaml";

#[derive(Debug, Deserialize, Serialize)]
struct LearnerState {
    kl_coeff: f32,
    n_opts: usize,
}

/// Experience of a rollout prepared for minibatch updates.
struct Prepared<'a, O> {
    obs: Vec<&'a O>,
    acts: Vec<u32>,
    logp_old: Vec<f32>,
    // Flattened `[n, n_actions]`.
    logits_old: Vec<f32>,
    values_old: Vec<f32>,
    advantages: Vec<f32>,
    targets: Vec<f32>,
}

#[derive(Default)]
struct LossStats {
    n: usize,
    total_loss: f32,
    policy_loss: f32,
    vf_loss: f32,
    entropy: f32,
    kl: f32,
}

impl LossStats {
    fn push(&mut self, [total_loss, policy_loss, vf_loss, entropy, kl]: [f32; 5]) {
        self.n += 1;
        self.total_loss += total_loss;
        self.policy_loss += policy_loss;
        self.vf_loss += vf_loss;
        self.entropy += entropy;
        self.kl += kl;
    }

    fn mean(&self, v: f32) -> f32 {
        v / self.n.max(1) as f32
    }
}

/// Adapts the coefficient of the KL loss to the observed divergence.
pub(crate) fn update_kl_coeff(kl_coeff: f32, kl: f32, kl_target: f32) -> f32 {
    if kl > 2.0 * kl_target {
        kl_coeff * 1.5
    } else if kl < 0.5 * kl_target {
        kl_coeff * 0.5
    } else {
        kl_coeff
    }
}

/// `1 - Var[y - pred] / Var[y]`, bounded below by `-1`.
pub(crate) fn explained_variance(y: &[f32], pred: &[f32]) -> f32 {
    fn var(xs: impl Iterator<Item = f32> + Clone) -> f32 {
        let n = xs.clone().count().max(1) as f32;
        let mean = xs.clone().sum::<f32>() / n;
        xs.map(|x| (x - mean).powi(2)).sum::<f32>() / n
    }
    let y_var = var(y.iter().copied());
    if y_var <= 0.0 {
        return -1.0;
    }
    let diff_var = var(y.iter().zip(pred.iter()).map(|(a, b)| a - b));
    (1.0 - diff_var / y_var).max(-1.0)
}

fn log_softmax_at(logits: &[f32], ix: usize) -> f32 {
    let max = logits.iter().fold(f32::NEG_INFINITY, |m, &v| m.max(v));
    let lse = logits.iter().map(|v| (v - max).exp()).sum::<f32>().ln() + max;
    logits[ix] - lse
}

/// Proximal policy optimization agent with a clipped surrogate objective,
/// an adaptive KL penalty and a clipped value loss.
///
/// In training mode actions are sampled from the categorical distribution of
/// the policy; in evaluation mode the most probable action is taken.
pub struct Ppo<E>
where
    E: Env,
    E::Obs: PixelObs,
    E::Act: DiscreteAct,
{
    config: PpoConfig,
    model: ActorCritic,
    kl_coeff: f32,
    train: bool,
    n_opts: usize,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E> Ppo<E>
where
    E: Env,
    E::Obs: PixelObs,
    E::Act: DiscreteAct,
{
    /// Current coefficient of the KL loss.
    pub fn kl_coeff(&self) -> f32 {
        self.kl_coeff
    }

    /// The number of optimization steps done.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Logits of the policy for an observation.
    pub fn logits(&self, obs: &E::Obs) -> Result<Vec<f32>> {
        let xs = self.obs_to_tensor(&[obs])?;
        Ok(self.model.logits(&xs)?.squeeze(0)?.to_vec1::<f32>()?)
    }

    fn device(&self) -> &Device {
        self.model.device()
    }

    fn obs_to_tensor(&self, obs: &[&E::Obs]) -> Result<Tensor> {
        let shape = self.model.in_shape();
        let mut data = Vec::with_capacity(obs.len() * shape.iter().product::<usize>());
        for o in obs.iter() {
            if o.shape() != shape {
                return Err(AgentError::ObsShapeMismatch {
                    expected: shape,
                    actual: o.shape(),
                }
                .into());
            }
            data.extend_from_slice(o.pixels());
        }
        let [h, w, c] = shape;
        Ok(Tensor::from_vec(data, (obs.len(), h, w, c), self.device())?)
    }

    /// Logits and values of observations, evaluated in chunks.
    fn evaluate(&self, obs: &[&E::Obs]) -> Result<(Vec<f32>, Vec<f32>)> {
        let mut logits = Vec::with_capacity(obs.len() * self.config.n_actions);
        let mut values = Vec::with_capacity(obs.len());
        for chunk in obs.chunks(self.config.minibatch_size) {
            let (l, v) = self.model.forward(&self.obs_to_tensor(chunk)?)?;
            logits.extend(l.flatten_all()?.to_vec1::<f32>()?);
            values.extend(v.to_vec1::<f32>()?);
        }
        Ok((logits, values))
    }

    fn state_values(&self, obs: &[&E::Obs]) -> Result<Vec<f32>> {
        let mut values = Vec::with_capacity(obs.len());
        for chunk in obs.chunks(self.config.minibatch_size) {
            let v = self.model.values(&self.obs_to_tensor(chunk)?)?;
            values.extend(v.to_vec1::<f32>()?);
        }
        Ok(values)
    }

    /// Adds a segment with its advantages and value targets.
    fn prepare_segment<'a>(
        &self,
        seg: &'a Segment<E>,
        data: &mut Prepared<'a, E::Obs>,
    ) -> Result<()> {
        let n = seg.len();
        if n == 0 {
            return Ok(());
        }
        let n_actions = self.config.n_actions;
        let obs = seg.obs.iter().collect::<Vec<_>>();
        let (logits, values) = self.evaluate(&obs)?;

        // Observations whose values bootstrap the returns
        let mut boot_ixs = vec![];
        let mut boot_obs = vec![];
        for t in 0..n {
            if seg.is_truncated[t] && !seg.is_terminated[t] {
                if let Some(o) = seg.final_obs[t].as_ref() {
                    boot_ixs.push(t);
                    boot_obs.push(o);
                }
            }
        }
        if !seg.is_done(n - 1) {
            boot_ixs.push(n - 1);
            boot_obs.push(&seg.last_obs);
        }
        let boot_values = self.state_values(&boot_obs)?;

        let mut next_values = (0..n)
            .map(|t| match seg.is_done(t) || t + 1 == n {
                true => 0.0,
                false => values[t + 1],
            })
            .collect::<Vec<_>>();
        for (&t, &v) in boot_ixs.iter().zip(boot_values.iter()) {
            next_values[t] = v;
        }

        let is_done = (0..n).map(|t| seg.is_done(t)).collect::<Vec<_>>();
        let lambda = if self.config.use_gae {
            self.config.lambda
        } else {
            1.0
        };
        let (advantages, targets) = compute_gae(
            &seg.rewards,
            &values,
            &next_values,
            &is_done,
            self.config.gamma,
            lambda,
        );

        for (t, a) in seg.acts.iter().enumerate() {
            let ix = a.index();
            if ix >= n_actions {
                return Err(AgentError::ActionOutOfRange(ix, n_actions).into());
            }
            let row = &logits[t * n_actions..(t + 1) * n_actions];
            data.acts.push(ix as u32);
            data.logp_old.push(log_softmax_at(row, ix));
        }
        data.obs.extend(obs);
        data.logits_old.extend(logits);
        data.values_old.extend(values);
        data.advantages.extend(advantages);
        data.targets.extend(targets);

        Ok(())
    }

    fn prepare<'a>(&self, rollout: &'a Rollout<E>) -> Result<Prepared<'a, E::Obs>> {
        let n = rollout.len();
        let mut data = Prepared {
            obs: Vec::with_capacity(n),
            acts: Vec::with_capacity(n),
            logp_old: Vec::with_capacity(n),
            logits_old: Vec::with_capacity(n * self.config.n_actions),
            values_old: Vec::with_capacity(n),
            advantages: Vec::with_capacity(n),
            targets: Vec::with_capacity(n),
        };
        for seg in rollout.segments.iter() {
            self.prepare_segment(seg, &mut data)?;
        }
        standardize(&mut data.advantages);
        Ok(data)
    }

    /// Performs a gradient step on a minibatch and returns
    /// `[total_loss, policy_loss, vf_loss, entropy, kl]`.
    fn update_minibatch(&mut self, data: &Prepared<E::Obs>, ixs: &[usize]) -> Result<[f32; 5]> {
        let m = ixs.len();
        let n_actions = self.config.n_actions;
        let device = self.device().clone();
        let pick = |xs: &[f32]| ixs.iter().map(|&i| xs[i]).collect::<Vec<_>>();

        let obs = self.obs_to_tensor(&ixs.iter().map(|&i| data.obs[i]).collect::<Vec<_>>())?;
        let acts = Tensor::from_vec(
            ixs.iter().map(|&i| data.acts[i]).collect::<Vec<_>>(),
            (m, 1),
            &device,
        )?;
        let adv = Tensor::from_vec(pick(&data.advantages), m, &device)?;
        let targets = Tensor::from_vec(pick(&data.targets), m, &device)?;
        let logp_old = Tensor::from_vec(pick(&data.logp_old), m, &device)?;
        let logits_old = Tensor::from_vec(
            ixs.iter()
                .flat_map(|&i| data.logits_old[i * n_actions..(i + 1) * n_actions].iter().copied())
                .collect::<Vec<_>>(),
            (m, n_actions),
            &device,
        )?;

        let (logits, values) = self.model.forward(&obs)?;
        let log_probs = log_softmax(&logits, D::Minus1)?;

        // Clipped surrogate
        let logp = log_probs.gather(&acts, 1)?.squeeze(1)?;
        let ratio = (logp - logp_old)?.exp()?;
        let clip = self.config.clip_param;
        let surrogate = (&ratio * &adv)?.minimum(&(ratio.clamp(1.0 - clip, 1.0 + clip)? * &adv)?)?;
        let policy_loss = surrogate.neg()?.mean_all()?;

        // KL divergence from the sampling policy
        let log_probs_old = log_softmax(&logits_old, D::Minus1)?;
        let kl = (log_probs_old.exp()? * (&log_probs_old - &log_probs)?)?
            .sum(1)?
            .mean_all()?;

        let entropy = (log_probs.exp()? * &log_probs)?.sum(1)?.neg()?.mean_all()?;

        let vf_loss = (values - targets)?
            .sqr()?
            .clamp(0f32, self.config.vf_clip_param)?
            .mean_all()?;

        let mut total_loss = ((&policy_loss + (&vf_loss * self.config.vf_loss_coeff as f64)?)?
            - (&entropy * self.config.entropy_coeff as f64)?)?;
        if self.config.use_kl_loss {
            total_loss = (total_loss + (&kl * self.kl_coeff as f64)?)?;
        }

        self.model.backward_step(&total_loss)?;

        Ok([
            total_loss.to_scalar::<f32>()?,
            policy_loss.to_scalar::<f32>()?,
            vf_loss.to_scalar::<f32>()?,
            entropy.to_scalar::<f32>()?,
            kl.to_scalar::<f32>()?,
        ])
    }

    fn opt_(&mut self, rollout: &Rollout<E>) -> Result<Record> {
        ensure!(!rollout.is_empty(), "PPO needs a non-empty rollout");
        let data = self.prepare(rollout)?;
        let n = data.obs.len();
        let mut ixs = (0..n).collect::<Vec<_>>();
        let mut stats = LossStats::default();

        for epoch in 0..self.config.num_epochs {
            ixs.shuffle(&mut self.rng);
            for batch in ixs.chunks(self.config.minibatch_size) {
                stats.push(self.update_minibatch(&data, batch)?);
            }
            debug!("Epoch {}: mean KL = {}", epoch, stats.mean(stats.kl));
        }

        let mean_kl = stats.mean(stats.kl);
        if self.config.use_kl_loss {
            self.kl_coeff = update_kl_coeff(self.kl_coeff, mean_kl, self.config.kl_target);
        }
        self.n_opts += 1;

        Ok(Record::from_slice(&[
            (
                "learners/total_loss",
                RecordValue::Scalar(stats.mean(stats.total_loss)),
            ),
            (
                "learners/policy_loss",
                RecordValue::Scalar(stats.mean(stats.policy_loss)),
            ),
            (
                "learners/vf_loss",
                RecordValue::Scalar(stats.mean(stats.vf_loss)),
            ),
            (
                "learners/entropy",
                RecordValue::Scalar(stats.mean(stats.entropy)),
            ),
            ("learners/mean_kl_loss", RecordValue::Scalar(mean_kl)),
            ("learners/curr_kl_coeff", RecordValue::Scalar(self.kl_coeff)),
            (
                "learners/vf_explained_var",
                RecordValue::Scalar(explained_variance(&data.targets, &data.values_old)),
            ),
            (
                "learners/num_env_steps_trained",
                RecordValue::Scalar(n as f32),
            ),
        ]))
    }
}

impl<E> Configurable for Ppo<E>
where
    E: Env,
    E::Obs: PixelObs,
    E::Act: DiscreteAct,
{
    type Config = PpoConfig;

    /// Constructs PPO agent.
    fn build(config: Self::Config) -> Result<Self> {
        if config.minibatch_size == 0 || config.num_epochs == 0 || config.n_actions == 0 {
            return Err(AgentError::InvalidConfig(
                "minibatch_size, num_epochs and n_actions must be positive".to_string(),
            )
            .into());
        }
        let device = Device::try_from(config.device)?;
        let model = ActorCritic::build(
            &config.model,
            config.obs_shape,
            config.n_actions,
            &config.optimizer,
            config.lr,
            device,
        )?;
        info!(
            "PPO agent for observations {:?} and {} actions",
            config.obs_shape, config.n_actions
        );

        Ok(Self {
            kl_coeff: config.kl_coeff,
            rng: SmallRng::seed_from_u64(config.seed),
            config,
            model,
            train: false,
            n_opts: 0,
            phantom: PhantomData,
        })
    }
}

impl<E> Policy<E> for Ppo<E>
where
    E: Env,
    E::Obs: PixelObs,
    E::Act: DiscreteAct,
{
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let xs = self.obs_to_tensor(&[obs])?;
        let logits = self.model.logits(&xs)?.squeeze(0)?;
        let ix = if self.train {
            let probs = softmax(&logits, 0)?.to_vec1::<f32>()?;
            WeightedIndex::new(&probs)?.sample(&mut self.rng)
        } else {
            logits.argmax(0)?.to_scalar::<u32>()? as usize
        };
        Ok(E::Act::from_index(ix))
    }
}

impl<E> Agent<E> for Ppo<E>
where
    E: Env,
    E::Obs: PixelObs,
    E::Act: DiscreteAct,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt_with_record(&mut self, rollout: &Rollout<E>) -> Result<Record> {
        self.opt_(rollout)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.model.save(path.join(POLICY_FILE))?;
        let state = LearnerState {
            kl_coeff: self.kl_coeff,
            n_opts: self.n_opts,
        };
        fs::write(path.join(LEARNER_STATE_FILE), serde_yaml::to_string(&state)?)?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.model.load(path.join(POLICY_FILE))?;
        let state_path = path.join(LEARNER_STATE_FILE);
        if state_path.exists() {
            let state: LearnerState = serde_yaml::from_str(&fs::read_to_string(state_path)?)?;
            self.kl_coeff = state.kl_coeff;
            self.n_opts = state.n_opts;
        }
        Ok(())
    }
}
