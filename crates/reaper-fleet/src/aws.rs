//! AWS backend: Auto Scaling for groups and terminations, EC2 for launch times.

use async_trait::async_trait;
use aws_sdk_autoscaling::error::DisplayErrorContext;
use aws_sdk_autoscaling::types::AutoScalingGroup;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::client::{FleetInventory, FleetMutator};
use crate::error::{FleetError, FleetResult};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct AwsFleet {
    autoscaling: aws_sdk_autoscaling::Client,
    ec2: aws_sdk_ec2::Client,
}

impl AwsFleet {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            autoscaling: aws_sdk_autoscaling::Client::new(config),
            ec2: aws_sdk_ec2::Client::new(config),
        }
    }

    /// Build clients from the default credential and region chain.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_autoscaling::config::Region::new(region));
        }
        let config = loader.load().await;
        Self::new(&config)
    }
}

fn group_from_asg(asg: &AutoScalingGroup) -> Group {
    Group {
        name: asg.auto_scaling_group_name().unwrap_or_default().to_string(),
        desired_capacity: asg.desired_capacity().unwrap_or(0).max(0) as u32,
        instances: asg
            .instances()
            .iter()
            .filter_map(|inst| {
                Some(InstanceRef {
                    id: inst.instance_id()?.to_string(),
                    lifecycle_state: inst
                        .lifecycle_state()
                        .map(|s| LifecycleState::from_provider(s.as_str()))
                        .unwrap_or(LifecycleState::Unknown),
                    health_status: HealthStatus::from_provider(
                        inst.health_status().unwrap_or_default(),
                    ),
                })
            })
            .collect(),
        tags: asg
            .tags()
            .iter()
            .filter_map(|tag| Some(Tag::new(tag.key()?, tag.value().unwrap_or_default())))
            .collect(),
    }
}

#[async_trait]
impl FleetInventory for AwsFleet {
    async fn list_groups(&self) -> FleetResult<Vec<Group>> {
        let mut groups = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let resp = self
                .autoscaling
                .describe_auto_scaling_groups()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| FleetError::Listing(DisplayErrorContext(&e).to_string()))?;

            groups.extend(resp.auto_scaling_groups().iter().map(group_from_asg));

            match resp.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(groups = groups.len(), "autoscaling groups listed");
        Ok(groups)
    }

    async fn describe_instances(&self, ids: &[InstanceId]) -> FleetResult<Vec<InstanceDetail>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let resp = self
            .ec2
            .describe_instances()
            .set_instance_ids(Some(ids.to_vec()))
            .send()
            .await
            .map_err(|e| {
                FleetError::Describe(aws_sdk_ec2::error::DisplayErrorContext(&e).to_string())
            })?;

        Ok(resp
            .reservations()
            .iter()
            .flat_map(|reservation| reservation.instances())
            .filter_map(|inst| {
                let launched = inst.launch_time()?;
                Some(InstanceDetail {
                    id: inst.instance_id()?.to_string(),
                    launch_time: DateTime::<Utc>::from_timestamp(
                        launched.secs(),
                        launched.subsec_nanos(),
                    )?,
                })
            })
            .collect())
    }
}

#[async_trait]
impl FleetMutator for AwsFleet {
    async fn terminate_instance(&self, instance_id: &str) -> FleetResult<()> {
        info!(%instance_id, "requesting instance termination");
        self.autoscaling
            .terminate_instance_in_auto_scaling_group()
            .instance_id(instance_id)
            .should_decrement_desired_capacity(false)
            .send()
            .await
            .map_err(|e| FleetError::Terminate {
                instance_id: instance_id.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}
