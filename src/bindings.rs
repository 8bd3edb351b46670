use alloy::sol;

use crate::fee::MessagingFee;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract MyOAppRead {
        struct EVMCallRequestV1 {
            uint16 appRequestLabel;
            uint32 targetEid;
            bool isBlockNum;
            uint64 blockNumOrTimestamp;
            uint16 confirmations;
            address to;
            bytes callData;
        }

        struct EVMCallComputeV1 {
            uint8 computeSetting;
            uint32 targetEid;
            bool isBlockNum;
            uint64 blockNumOrTimestamp;
            uint16 confirmations;
            address to;
        }

        struct MessagingFee {
            uint256 nativeFee;
            uint256 lzTokenFee;
        }

        struct MessagingReceipt {
            bytes32 guid;
            uint64 nonce;
            MessagingFee fee;
        }

        function setVerifier(address _verifier) external;

        function verifyProof(
            uint256[2] calldata _pA,
            uint256[2][2] calldata _pB,
            uint256[2] calldata _pC,
            uint256[2] calldata _pubSignals
        ) external view returns (bool);

        function setPeer(uint32 _eid, bytes32 _peer) external;

        function peers(uint32 _eid) external view returns (bytes32 peer);

        function setReadChannel(uint32 _channelId, bool _active) external;

        function quote(
            uint32 _channelId,
            uint16 _appLabel,
            EVMCallRequestV1[] memory _requests,
            EVMCallComputeV1 memory _computeSettings,
            bytes calldata _options,
            bool _payInLzToken
        ) external view returns (MessagingFee memory fee);

        function send(
            uint32 _channelId,
            uint16 _appLabel,
            EVMCallRequestV1[] memory _requests,
            EVMCallComputeV1 memory _computeSettings,
            bytes calldata _options
        ) external payable returns (MessagingReceipt memory receipt);

        function data() external view returns (bytes memory);
    }
}

impl From<MyOAppRead::MessagingFee> for MessagingFee {
    fn from(fee: MyOAppRead::MessagingFee) -> Self {
        Self {
            native_fee: fee.nativeFee,
            lz_token_fee: fee.lzTokenFee,
        }
    }
}
