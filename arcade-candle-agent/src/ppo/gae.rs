//! Generalized advantage estimation.

/// Computes advantages and value targets of a segment.
///
/// * `values[t]` - value of the observation on which action `t` was taken.
/// * `next_values[t]` - value of the observation following step `t`, `0` if
///   step `t` terminated the episode.
/// * `is_done[t]` - step `t` ended an episode, by termination or truncation.
///
/// The advantage trace is cut at episode ends, so a segment may contain
/// several episodes.
pub fn compute_gae(
    rewards: &[f32],
    values: &[f32],
    next_values: &[f32],
    is_done: &[bool],
    gamma: f32,
    lambda: f32,
) -> (Vec<f32>, Vec<f32>) {
    let n = rewards.len();
    debug_assert!(values.len() == n && next_values.len() == n && is_done.len() == n);
    let mut advantages = vec![0f32; n];
    let mut last_gae = 0f32;

    for t in (0..n).rev() {
        let delta = rewards[t] + gamma * next_values[t] - values[t];
        let not_done = if is_done[t] { 0.0 } else { 1.0 };
        last_gae = delta + gamma * lambda * not_done * last_gae;
        advantages[t] = last_gae;
    }

    let targets = advantages
        .iter()
        .zip(values.iter())
        .map(|(a, v)| a + v)
        .collect();

    (advantages, targets)
}

/// Shifts and scales values to zero mean and unit variance.
pub fn standardize(xs: &mut [f32]) {
    if xs.is_empty() {
        return;
    }
    let n = xs.len() as f32;
    let mean = xs.iter().sum::<f32>() / n;
    let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / n;
    let std = var.sqrt().max(1e-4);
    xs.iter_mut().for_each(|x| *x = (*x - mean) / std);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(xs: &[f32], ys: &[f32]) {
        assert_eq!(xs.len(), ys.len());
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!((x - y).abs() < 1e-5, "{:?} != {:?}", xs, ys);
        }
    }

    #[test]
    fn lambda_one_gives_discounted_returns() {
        let rewards = [1.0, 1.0, 1.0];
        let values = [0.0; 3];
        let next_values = [0.0; 3];
        let is_done = [false, false, true];
        let (adv, targets) = compute_gae(&rewards, &values, &next_values, &is_done, 0.5, 1.0);
        assert_close(&adv, &[1.75, 1.5, 1.0]);
        assert_close(&targets, &adv);
    }

    #[test]
    fn trace_is_cut_at_episode_end() {
        let rewards = [1.0, 2.0];
        let values = [0.5, 0.5];
        // Step 0 terminates, step 1 is bootstrapped with value 1.0.
        let next_values = [0.0, 1.0];
        let is_done = [true, false];
        let (adv, targets) = compute_gae(&rewards, &values, &next_values, &is_done, 0.9, 0.95);
        assert_close(&adv, &[0.5, 2.0 + 0.9 - 0.5]);
        assert_close(&targets, &[1.0, 2.9]);
    }

    #[test]
    fn lambda_zero_gives_td_errors() {
        let rewards = [0.0, 1.0];
        let values = [1.0, 2.0];
        let next_values = [2.0, 3.0];
        let is_done = [false, false];
        let (adv, _) = compute_gae(&rewards, &values, &next_values, &is_done, 0.99, 0.0);
        assert_close(&adv, &[0.99 * 2.0 - 1.0, 1.0 + 0.99 * 3.0 - 2.0]);
    }

    #[test]
    fn standardized_values_have_zero_mean_unit_variance() {
        let mut xs = vec![1.0, 2.0, 3.0, 4.0];
        standardize(&mut xs);
        let mean = xs.iter().sum::<f32>() / 4.0;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f32>() / 4.0;
        assert!(mean.abs() < 1e-6);
        assert!((var - 1.0).abs() < 1e-5);

        let mut constant = vec![3.0; 5];
        standardize(&mut constant);
        assert!(constant.iter().all(|x| x.abs() < 1e-6));
    }
}
