//! End-to-end behaviour of the pack/unpack operation.

use rand::{Rng, SeedableRng, rngs::StdRng};
use seqpack::{
    CpuData, DataType, Device, DeviceId, Direction, PackSequence, PackSequenceConfig,
    SeqPackError, Tensor, TensorData, TensorDesc, infer_output_desc, pack, pack_or_unpack,
    pack_rnn_sequence, rnn_sequence, unpack, unpack_rnn_sequence,
};
use std::sync::atomic::{AtomicUsize, Ordering};

fn lengths(values: &[i32]) -> Tensor {
    Tensor::from_values(vec![values.len()], values).unwrap()
}

#[test]
fn packs_two_sequences_with_trailing_padding() {
    let values = Tensor::from_values(vec![5, 1], &[1.0f32, 2.0, 3.0, 4.0, 5.0]).unwrap();
    let lengths = lengths(&[2, 3]);

    let packed = pack(&values, &lengths).unwrap();
    assert_eq!(packed.dims(), &[3, 2, 1]);
    assert_eq!(packed.desc.data_type(), DataType::Float);
    assert_eq!(
        packed.to_vec::<f32>().unwrap(),
        vec![1.0, 3.0, 2.0, 4.0, 0.0, 5.0]
    );

    let unpacked = unpack(&packed, &lengths).unwrap();
    assert_eq!(unpacked.dims(), &[5, 1]);
    assert_eq!(
        unpacked.to_vec::<f32>().unwrap(),
        vec![1.0, 2.0, 3.0, 4.0, 5.0]
    );
}

#[test]
fn empty_lengths_pack_to_empty_grid() {
    let values = Tensor::from_values::<i64>(vec![0, 4, 2], &[]).unwrap();
    let packed = pack(&values, &lengths(&[])).unwrap();
    assert_eq!(packed.dims(), &[0, 0, 4, 2]);
    assert!(packed.to_vec::<i64>().unwrap().is_empty());

    let unpacked = unpack(&packed, &lengths(&[])).unwrap();
    assert_eq!(unpacked.dims(), &[0, 4, 2]);
}

#[test]
fn all_zero_lengths_keep_columns() {
    let values = Tensor::from_values::<f64>(vec![0, 3], &[]).unwrap();
    let packed = pack(&values, &lengths(&[0, 0])).unwrap();
    assert_eq!(packed.dims(), &[0, 2, 3]);
}

#[test]
fn zero_length_sequence_leaves_its_column_zero() {
    let values = Tensor::from_values(vec![3, 2], &[1i32, 2, 3, 4, 5, 6]).unwrap();
    let packed = pack(&values, &lengths(&[2, 0, 1])).unwrap();
    assert_eq!(packed.dims(), &[2, 3, 2]);
    assert_eq!(
        packed.to_vec::<i32>().unwrap(),
        vec![
            1, 2, 0, 0, 5, 6, //
            3, 4, 0, 0, 0, 0,
        ]
    );
}

#[test]
fn extra_ragged_positions_are_ignored() {
    let values = Tensor::from_values(vec![4, 1], &[7i64, 8, 9, 10]).unwrap();
    let packed = pack(&values, &lengths(&[1, 2])).unwrap();
    assert_eq!(packed.to_vec::<i64>().unwrap(), vec![7, 8, 0, 9]);
}

#[test]
fn multi_axis_feature_blocks_round_trip() {
    let data: Vec<f64> = (0..7 * 2 * 3).map(|v| v as f64 * 0.5).collect();
    let values = Tensor::from_values(vec![7, 2, 3], &data).unwrap();
    let lengths = lengths(&[4, 1, 2]);

    let packed = pack(&values, &lengths).unwrap();
    assert_eq!(packed.dims(), &[4, 3, 2, 3]);

    let back = unpack(&packed, &lengths).unwrap();
    assert_eq!(back.dims(), values.dims());
    assert_eq!(back.to_vec::<f64>().unwrap(), data);
}

#[test]
fn negative_length_is_rejected() {
    let values = Tensor::from_values(vec![3, 1], &[1i32, 2, 3]).unwrap();
    let err = pack(&values, &lengths(&[2, -1, 1])).unwrap_err();
    assert!(matches!(err, SeqPackError::InvalidArgument(_)));
}

#[test]
fn too_few_axes_is_rejected() {
    let values = Tensor::from_values(vec![3], &[1i32, 2, 3]).unwrap();
    assert!(matches!(
        pack(&values, &lengths(&[3])),
        Err(SeqPackError::InvalidArgument(_))
    ));

    let padded = Tensor::from_values(vec![3, 1], &[1i32, 2, 3]).unwrap();
    assert!(matches!(
        unpack(&padded, &lengths(&[3])),
        Err(SeqPackError::InvalidArgument(_))
    ));
}

#[test]
fn unsupported_element_type_is_rejected() {
    let desc = TensorDesc::new(vec![2, 1], DataType::Uint8).unwrap();
    let values = Tensor::new_cpu(desc, vec![1u8, 2].into_boxed_slice()).unwrap();
    assert_eq!(
        pack(&values, &lengths(&[2])).unwrap_err(),
        SeqPackError::UnsupportedType(DataType::Uint8)
    );
    assert_eq!(
        infer_output_desc(Direction::Forward, &values.desc, &lengths(&[2])).unwrap_err(),
        SeqPackError::UnsupportedType(DataType::Uint8)
    );
}

#[test]
fn output_desc_matches_executed_output() {
    let values = Tensor::from_values(vec![6, 2], &[0i32; 12]).unwrap();
    let lengths = lengths(&[1, 5]);
    let desc = infer_output_desc(Direction::Forward, &values.desc, &lengths).unwrap();
    let packed = pack_or_unpack(Direction::Forward, &values, &lengths).unwrap();
    assert_eq!(desc, packed.desc);
    assert_eq!(desc.dims(), &[5, 2, 2]);
}

#[test]
fn instructions_check_arity_and_execute() {
    let values = Tensor::from_values(vec![5, 1], &[1i32, 2, 3, 4, 5]).unwrap();
    let lengths = lengths(&[2, 3]);

    let pack_op = pack_rnn_sequence();
    assert_eq!(pack_op.name(), "PackRNNSequence");
    assert!(matches!(
        pack_op.execute_cpu(&[&values]),
        Err(SeqPackError::InvalidArgument(_))
    ));

    let descs = pack_op.infer_output_descs(&[&values, &lengths]).unwrap();
    assert_eq!(descs[0].dims(), &[3, 2, 1]);

    let packed = pack_op.execute_cpu(&[&values, &lengths]).unwrap();
    assert_eq!(packed.len(), 1);
    assert_eq!(packed[0].to_vec::<i32>().unwrap(), vec![1, 3, 2, 4, 0, 5]);

    let unpack_op = unpack_rnn_sequence().clone_box();
    assert_eq!(unpack_op.name(), "UnpackRNNSequence");
    let ragged = unpack_op.execute_cpu(&[&packed[0], &lengths]).unwrap();
    assert_eq!(ragged[0].to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 5]);
    assert_eq!(
        format!("{:?}", unpack_op),
        "UnpackRNNSequence(direction=Backward, threads=1)"
    );
}

#[test]
fn invalid_config_is_rejected() {
    let err = rnn_sequence(PackSequenceConfig {
        num_threads: 0,
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, SeqPackError::InvalidArgument(_)));
}

/// Host backend that counts the primitives it is asked to perform.
#[derive(Default)]
struct CountingDevice {
    allocations: AtomicUsize,
    fills: AtomicUsize,
    copies: AtomicUsize,
}

impl Device for CountingDevice {
    fn id(&self) -> DeviceId {
        DeviceId::Accelerator(0)
    }

    fn allocate(&self, len_bytes: usize) -> Box<dyn TensorData> {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        // deliberately dirty so a missing fill would show up
        Box::new(CpuData::from_vec(vec![0xAB; len_bytes].into_boxed_slice()))
    }

    fn fill(&self, dst: &mut [u8], pattern: &[u8]) {
        self.fills.fetch_add(1, Ordering::Relaxed);
        for chunk in dst.chunks_exact_mut(pattern.len()) {
            chunk.copy_from_slice(pattern);
        }
    }

    fn copy_items(&self, src: &[u8], dst: &mut [u8]) {
        self.copies.fetch_add(1, Ordering::Relaxed);
        dst.copy_from_slice(src);
    }
}

#[test]
fn injected_device_does_the_memory_work() {
    let device = CountingDevice::default();
    let values = Tensor::from_values(vec![5, 3], &[1.5f32; 15]).unwrap();
    let lengths = lengths(&[2, 3]);

    let packed = PackSequence::with_direction(Direction::Forward)
        .run_on(&device, &values, &lengths)
        .unwrap();

    assert_eq!(packed.device, DeviceId::Accelerator(0));
    assert!(!packed.is_cpu());
    assert_eq!(device.allocations.load(Ordering::Relaxed), 1);
    assert_eq!(device.fills.load(Ordering::Relaxed), 1);
    // one copy per valid position, never per element
    assert_eq!(device.copies.load(Ordering::Relaxed), 5);

    let out = packed.to_vec::<f32>().unwrap();
    assert_eq!(&out[12..15], &[0.0, 0.0, 0.0]);
    assert_eq!(out.iter().filter(|&&v| v == 1.5).count(), 15);
}

#[test]
fn errors_happen_before_allocation() {
    let device = CountingDevice::default();
    let values = Tensor::from_values(vec![2, 1], &[1i32, 2]).unwrap();
    assert!(
        PackSequence::with_direction(Direction::Forward)
            .run_on(&device, &values, &lengths(&[1, -2]))
            .is_err()
    );
    assert_eq!(device.allocations.load(Ordering::Relaxed), 0);
}

#[test]
fn values_storage_shorter_than_descriptor_is_rejected() {
    let values = Tensor {
        desc: TensorDesc::new(vec![5, 1], DataType::Int32).unwrap(),
        device: DeviceId::CPU,
        buffer: Box::new(CpuData::from_vec(vec![0u8; 4].into_boxed_slice())),
    };
    assert!(matches!(
        pack(&values, &lengths(&[2, 3])),
        Err(SeqPackError::InvalidArgument(_))
    ));
}

/// Backend whose allocations come back one element short.
struct ShortDevice;

impl Device for ShortDevice {
    fn id(&self) -> DeviceId {
        DeviceId::Accelerator(1)
    }

    fn allocate(&self, len_bytes: usize) -> Box<dyn TensorData> {
        let len = len_bytes.saturating_sub(4);
        Box::new(CpuData::from_vec(vec![0u8; len].into_boxed_slice()))
    }

    fn fill(&self, dst: &mut [u8], _pattern: &[u8]) {
        dst.fill(0);
    }

    fn copy_items(&self, src: &[u8], dst: &mut [u8]) {
        dst.copy_from_slice(src);
    }
}

#[test]
fn short_device_allocation_is_an_error() {
    let values = Tensor::from_values(vec![5, 1], &[1i32, 2, 3, 4, 5]).unwrap();
    let err = PackSequence::with_direction(Direction::Forward)
        .run_on(&ShortDevice, &values, &lengths(&[2, 3]))
        .unwrap_err();
    assert!(matches!(err, SeqPackError::InvalidArgument(_)));
}

#[test]
fn huge_empty_feature_shape_is_rejected_up_front() {
    let huge = usize::MAX / 4;
    assert!(matches!(
        Tensor::from_values::<f32>(vec![0, huge, huge], &[]),
        Err(SeqPackError::InvalidArgument(_))
    ));
    // a zero-extent shape that fits still packs
    let values = Tensor::from_values::<f32>(vec![0, 1 << 20, 2], &[]).unwrap();
    let packed = pack(&values, &lengths(&[])).unwrap();
    assert_eq!(packed.dims(), &[0, 0, 1 << 20, 2]);
}

#[test]
fn threaded_run_matches_serial_on_random_batches() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let threaded = PackSequence::new(PackSequenceConfig {
        num_threads: 4,
        min_blocks_per_thread: 1,
        ..Default::default()
    })
    .unwrap();

    for _ in 0..20 {
        let cols = rng.random_range(0..12usize);
        let lens: Vec<i32> = (0..cols).map(|_| rng.random_range(0..9)).collect();
        let total: usize = lens.iter().map(|&l| l as usize).sum();
        let feature = rng.random_range(1..4usize);
        let data: Vec<i64> = (0..total * feature).map(|_| rng.random()).collect();

        let values = Tensor::from_values(vec![total, feature], &data).unwrap();
        let lengths = lengths(&lens);

        let serial = pack(&values, &lengths).unwrap();
        let parallel = threaded.run(&values, &lengths).unwrap();
        assert_eq!(serial.bytes(), parallel.bytes());
        assert_eq!(serial.desc, parallel.desc);

        let back = PackSequence::new(PackSequenceConfig {
            direction: Direction::Backward,
            ..threaded.config().clone()
        })
        .unwrap()
        .run(&parallel, &lengths)
        .unwrap();
        assert_eq!(back.to_vec::<i64>().unwrap(), data);
    }
}
