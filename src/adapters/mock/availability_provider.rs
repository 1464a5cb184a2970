use crate::ports::availability_provider::{
    AvailabilityProvider as AvailabilityProviderTrait, CheckResponse, Result,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// 台本の1ステップ（check / poll の1回分の応答）
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    Respond(CheckResponse),
    Fail(String),
}

/// AvailabilityProviderのモック実装
///
/// 登録された応答を順に返す。台本が尽きた後は最後の応答を繰り返す。
/// 呼び出し回数を記録する。
pub struct AvailabilityProvider {
    steps: Mutex<VecDeque<ScriptedStep>>,
    last: Mutex<Option<ScriptedStep>>,
    checks: Mutex<usize>,
    polls: Mutex<usize>,
}

impl AvailabilityProvider {
    pub fn new(steps: Vec<ScriptedStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            checks: Mutex::new(0),
            polls: Mutex::new(0),
        }
    }

    /// 常に同じ応答を返すプロバイダ
    pub fn always(response: CheckResponse) -> Self {
        Self::new(vec![ScriptedStep::Respond(response)])
    }

    /// check呼び出し回数
    pub fn check_count(&self) -> usize {
        *self.checks.lock().unwrap()
    }

    /// poll呼び出し回数
    pub fn poll_count(&self) -> usize {
        *self.polls.lock().unwrap()
    }

    fn next_step(&self) -> Result<CheckResponse> {
        let step = {
            let mut steps = self.steps.lock().unwrap();
            let mut last = self.last.lock().unwrap();
            if let Some(step) = steps.pop_front() {
                *last = Some(step.clone());
            }
            last.clone()
        };
        match step {
            Some(ScriptedStep::Respond(response)) => Ok(response),
            Some(ScriptedStep::Fail(message)) => Err(message.into()),
            None => Err("no scripted response".into()),
        }
    }
}

#[async_trait]
impl AvailabilityProviderTrait for AvailabilityProvider {
    async fn check(&self, _isbns: &[String], _systemids: &[String]) -> Result<CheckResponse> {
        *self.checks.lock().unwrap() += 1;
        self.next_step()
    }

    async fn poll(&self, _session: &str) -> Result<CheckResponse> {
        *self.polls.lock().unwrap() += 1;
        self.next_step()
    }
}
