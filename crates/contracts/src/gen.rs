use ethers::contract::abigen;

abigen!(
    EntryPointAPI,
    r#"[
        struct PackedUserOperation {address sender;uint256 nonce;bytes initCode;bytes callData;bytes32 accountGasLimits;uint256 preVerificationGas;bytes32 gasFees;bytes paymasterAndData;bytes signature;}
        function handleOps(PackedUserOperation[] calldata ops,address payable beneficiary) external
        function getUserOpHash(PackedUserOperation calldata userOp) external view returns (bytes32)
        error FailedOp(uint256 opIndex, string reason)
        error FailedOpWithRevert(uint256 opIndex, string reason, bytes inner)
        error PostOpReverted(bytes returnData)
        event UserOperationRevertReason(bytes32 indexed userOpHash,address indexed sender,uint256 nonce,bytes revertReason)
        event UserOperationEvent(bytes32 indexed userOpHash,address indexed sender,address indexed paymaster,uint256 nonce,bool success,uint256 actualGasCost,uint256 actualGasUsed)
    ]"#
);
