use alloy::primitives::{Address, Bytes};

use crate::bindings::MyOAppRead;

/// Where and when a read executes: the app on the target chain and the
/// block the executors anchor the read to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadTarget {
    pub eid: u32,
    pub app: Address,
    pub block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub app_request_label: u16,
    pub target_eid: u32,
    pub is_block_num: bool,
    pub block_num_or_timestamp: u64,
    pub confirmations: u16,
    pub to: Address,
    pub call_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeRequest {
    pub compute_setting: u8,
    pub target_eid: u32,
    pub is_block_num: bool,
    pub block_num_or_timestamp: u64,
    pub confirmations: u16,
    pub to: Address,
}

/// Everything `quote` and `send` take, built once per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBundle {
    pub channel_id: u32,
    pub app_label: u16,
    pub requests: Vec<ReadRequest>,
    pub compute: ComputeRequest,
    pub options: Bytes,
}

impl ReadBundle {
    /// A single block-anchored read of `call_data` against `target`, with a
    /// compute step over the same anchor.
    pub fn single(
        channel_id: u32,
        app_label: u16,
        compute_setting: u8,
        confirmations: u16,
        target: ReadTarget,
        call_data: Bytes,
        options: Bytes,
    ) -> Self {
        let request = ReadRequest {
            app_request_label: app_label,
            target_eid: target.eid,
            is_block_num: true,
            block_num_or_timestamp: target.block,
            confirmations,
            to: target.app,
            call_data,
        };
        let compute = ComputeRequest {
            compute_setting,
            target_eid: target.eid,
            is_block_num: true,
            block_num_or_timestamp: target.block,
            confirmations,
            to: target.app,
        };

        Self {
            channel_id,
            app_label,
            requests: vec![request],
            compute,
            options,
        }
    }

    pub fn call_requests(&self) -> Vec<MyOAppRead::EVMCallRequestV1> {
        self.requests.iter().map(Into::into).collect()
    }
}

impl From<&ReadRequest> for MyOAppRead::EVMCallRequestV1 {
    fn from(request: &ReadRequest) -> Self {
        MyOAppRead::EVMCallRequestV1 {
            appRequestLabel: request.app_request_label,
            targetEid: request.target_eid,
            isBlockNum: request.is_block_num,
            blockNumOrTimestamp: request.block_num_or_timestamp,
            confirmations: request.confirmations,
            to: request.to,
            callData: request.call_data.clone(),
        }
    }
}

impl From<&ComputeRequest> for MyOAppRead::EVMCallComputeV1 {
    fn from(compute: &ComputeRequest) -> Self {
        MyOAppRead::EVMCallComputeV1 {
            computeSetting: compute.compute_setting,
            targetEid: compute.target_eid,
            isBlockNum: compute.is_block_num,
            blockNumOrTimestamp: compute.block_num_or_timestamp,
            confirmations: compute.confirmations,
            to: compute.to,
        }
    }
}
