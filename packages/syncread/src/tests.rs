// tests of the public API across both channels.

use crate::{error::*, *};
use rand::prelude::*;
use rand_pcg::Pcg32;
use std::{
    io::{Read, Write},
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc,
        Arc,
        Barrier,
    },
    thread,
    time::Duration,
};


fn new_rng() -> impl Rng {
    Pcg32::from_seed(0xdeadbeefdeadbeefdeadbeefdeadbeefu128.to_le_bytes())
}

fn read_all_now(channel: &Channel, cursor: &mut usize) -> Vec<u8> {
    let mut out = Vec::new();
    let signal = channel.signal();
    channel.read(usize::MAX, cursor, &mut out, &signal).unwrap();
    out
}

#[test]
fn concrete_scenario() {
    let device = Device::default();
    let alpha = device.channel(ChannelId::Alpha);
    let data = (0..100u8).collect::<Vec<_>>();

    assert_eq!(alpha.write(100, &mut &data[..]).unwrap(), 100);
    assert_eq!(alpha.snapshot().readable_length, 100);

    let mut reader = alpha.open_reader();
    let mut buf = [0; 50];
    assert_eq!(reader.read(&mut buf).unwrap(), 50);
    assert_eq!(&buf[..], &data[..50]);

    let mut buf = [0; 100];
    assert_eq!(reader.read(&mut buf).unwrap(), 50);
    assert_eq!(&buf[..50], &data[50..]);
    assert_eq!(reader.position(), 100);
}

#[test]
fn truncation_scenario() {
    let device = Device::default();
    let beta = device.channel(ChannelId::Beta);
    let mut writer = beta.open_writer().unwrap();

    assert_eq!(writer.write(&[1; 8190]), 8190);
    assert_eq!(writer.write(&[2; 10]), 2);
    assert_eq!(beta.snapshot().write_position, CAPACITY);
    assert_eq!(writer.write(&[3; 10]), 0);

    // io::Write reports a full channel as a zero-length write
    let err = Write::write_all(&mut writer, b"more").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::WriteZero);
}

#[test]
fn writer_open_rewinds_and_hides_old_data() {
    let device = Device::default();
    let alpha = device.channel(ChannelId::Alpha);

    let mut writer = alpha.open_writer().unwrap();
    writer.write(b"first");
    drop(writer);

    let writer = alpha.open_writer().unwrap();
    let snapshot = alpha.snapshot();
    assert_eq!(snapshot.write_position, 0);
    assert_eq!(snapshot.readable_length, 0);
    assert_eq!(snapshot.writer_count, 1);
    drop(writer);

    assert!(read_all_now(&alpha, &mut 0).is_empty());
}

#[test]
fn channels_are_isolated() {
    let device = Device::default();
    let alpha = device.channel(ChannelId::Alpha);
    let beta = device.channel(ChannelId::Beta);

    let mut beta_writer = beta.open_writer().unwrap();
    beta_writer.write(b"beta bytes");
    let beta_before = beta.snapshot();

    let mut alpha_writer = alpha.open_writer().unwrap();
    alpha_writer.write(&[0xaa; 300]);
    drop(alpha_writer);

    assert_eq!(beta.snapshot(), beta_before);
    assert_eq!(read_all_now(&beta, &mut 0), b"beta bytes");

    drop(beta_writer);
    assert_eq!(alpha.snapshot().write_position, 300);
    assert_eq!(read_all_now(&alpha, &mut 0), [0xaa; 300]);
}

#[test]
fn channel_by_minor() {
    let device = Device::default();
    assert_eq!(device.channel_by_minor(1).unwrap().id(), ChannelId::Beta);
    assert_eq!(device.channel_by_minor(3).unwrap_err(), UnknownChannel(3));
}

#[test]
fn writers_are_exclusive() {
    const THREADS: usize = 8;

    let device = Device::default();
    let inside = Arc::new(AtomicUsize::new(0));
    let max_inside = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let joins = (0..THREADS)
        .map(|i| {
            let channel = device.channel(ChannelId::Alpha);
            let inside = inside.clone();
            let max_inside = max_inside.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let mut writer = channel.open_writer().unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                assert_eq!(channel.snapshot().writer_count, 1);
                writer.write(&[i as u8; 4]);
                thread::sleep(Duration::from_millis(5));
                inside.fetch_sub(1, Ordering::SeqCst);
            })
        })
        .collect::<Vec<_>>();
    for join in joins {
        join.join().unwrap();
    }

    assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    let snapshot = device.channel(ChannelId::Alpha).snapshot();
    assert_eq!(snapshot.writer_count, 0);
    assert_eq!(snapshot.pending_write_opens, 0);
}

#[test]
fn reader_streams_while_writer_writes() {
    let device = Device::default();
    let channel = device.channel(ChannelId::Beta);
    let expected = (0..4000u32).map(|i| (i % 251) as u8).collect::<Vec<_>>();

    let mut writer = channel.open_writer().unwrap();
    let mut reader = channel.open_reader();

    let to_write = expected.clone();
    let join_1 = thread::spawn(move || {
        for chunk in to_write.chunks(333) {
            assert_eq!(writer.write(chunk), chunk.len());
            thread::sleep(Duration::from_millis(2));
        }
    });
    let join_2 = thread::spawn(move || {
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        out
    });

    join_1.join().unwrap();
    assert_eq!(join_2.join().unwrap(), expected);
}

#[test]
fn interrupted_writer_open_can_retry() {
    let device = Device::default();
    let channel = device.channel(ChannelId::Alpha);
    let holder = channel.open_writer().unwrap();

    let signal = device.signal();
    let (send, recv) = mpsc::channel();
    let channel_2 = channel.clone();
    let signal_2 = signal.clone();
    let join = thread::spawn(move || {
        let first = channel_2.open_writer_with(signal_2.clone()).map(drop);
        send.send(first).unwrap();
        let second = channel_2.open_writer_with(signal_2).map(drop);
        send.send(second).unwrap();
    });

    assert!(recv.recv_timeout(Duration::from_millis(50)).is_err());
    signal.raise();
    assert_eq!(recv.recv_timeout(Duration::from_secs(5)).unwrap(), Err(InterruptedWait));
    assert_eq!(channel.snapshot().writer_count, 1);

    // the retry blocks again until the holder closes
    assert!(recv.recv_timeout(Duration::from_millis(50)).is_err());
    drop(holder);
    assert_eq!(recv.recv_timeout(Duration::from_secs(5)).unwrap(), Ok(()));
    join.join().unwrap();
    assert_eq!(channel.snapshot().writer_count, 0);
}

#[test]
fn interrupted_read_is_io_interrupted() {
    let device = Device::default();
    let channel = device.channel(ChannelId::Alpha);
    let _writer = channel.open_writer().unwrap();
    let mut reader = channel.open_reader();
    reader.signal().raise();

    let mut buf = [0; 8];
    let err = Read::read(&mut reader, &mut buf).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::Interrupted);
    assert_eq!(reader.position(), 0);
    assert!(!reader.signal().is_pending());
}

#[test]
fn signal_from_device_clone_interrupts() {
    let device = Device::default();
    let channel = device.channel(ChannelId::Alpha);
    let holder = channel.open_writer().unwrap();

    let signal = device.clone().signal();
    let (send, recv) = mpsc::channel();
    let channel_2 = channel.clone();
    let signal_2 = signal.clone();
    let join = thread::spawn(move || {
        send.send(channel_2.open_writer_with(signal_2).map(drop)).unwrap();
    });

    assert!(recv.recv_timeout(Duration::from_millis(50)).is_err());
    signal.raise();
    assert_eq!(recv.recv_timeout(Duration::from_secs(5)).unwrap(), Err(InterruptedWait));
    join.join().unwrap();
    drop(holder);
}

#[test]
#[should_panic(expected = "signal belongs to a different device")]
fn writer_open_rejects_foreign_signal() {
    let device_1 = Device::default();
    let device_2 = Device::default();
    let channel = device_1.channel(ChannelId::Alpha);
    let _holder = channel.open_writer().unwrap();

    // would otherwise block forever, since raising device_2's signal never wakes device_1
    let _ = channel.open_writer_with(device_2.signal());
}

#[test]
#[should_panic(expected = "signal belongs to a different device")]
fn reader_open_rejects_foreign_signal() {
    let device_1 = Device::default();
    let device_2 = Device::default();
    let _ = device_1.channel(ChannelId::Beta).open_reader_with(device_2.signal());
}

#[test]
#[should_panic(expected = "signal belongs to a different device")]
fn low_level_read_rejects_foreign_signal() {
    let device_1 = Device::default();
    let device_2 = Device::default();
    let channel = device_1.channel(ChannelId::Alpha);
    let _ = channel.read(1, &mut 0, &mut Vec::<u8>::new(), &device_2.signal());
}

#[test]
fn legacy_policy_through_device() {
    let device = Device::new(Config::default().with_admission(AdmissionPolicy::Legacy));
    let alpha = device.channel(ChannelId::Alpha);

    // no exclusivity on the channel itself
    let _writer_1 = alpha.open_writer().unwrap();
    let _writer_2 = alpha.open_writer().unwrap();
    assert_eq!(alpha.snapshot().writer_count, 2);
    assert_eq!(device.config().admission(), AdmissionPolicy::Legacy);
}

#[test]
fn configured_capacity() {
    let device = Device::new(Config::default().with_capacity(16));
    let channel = device.channel(ChannelId::Beta);
    let mut writer = channel.open_writer().unwrap();
    assert_eq!(writer.write(&[7; 20]), 16);
    assert_eq!(device.capacity(), 16);
}

// state of one channel in the reference model.
struct ModelChannel {
    bytes: Vec<u8>,
    write_position: usize,
    writer: Option<Writer>,
}

#[test]
fn matches_model() {
    const CAP: usize = 256;

    let mut rng = new_rng();
    let device = Device::new(Config::default().with_capacity(CAP));
    let mut model = ChannelId::ALL.map(|_| ModelChannel {
        bytes: vec![0; CAP],
        write_position: 0,
        writer: None,
    });

    for _ in 0..20_000 {
        let id = *ChannelId::ALL.choose(&mut rng).unwrap();
        let channel = device.channel(id);
        let m = &mut model[id as usize];
        // every writer-open rewinds (readers are never counted), so readable length always
        // equals the write position
        let readable_length = m.write_position;

        match rng.gen_range(0..10) {
            0 => {
                // toggle the writer
                if m.writer.take().is_none() {
                    m.writer = Some(channel.open_writer().unwrap());
                    m.write_position = 0;
                }
            }
            1..=5 => {
                let n = rng.gen_range(0..64);
                let data = (0..n).map(|_| rng.gen()).collect::<Vec<u8>>();
                let written = channel.write(n, &mut &data[..]).unwrap();
                let expect = n.min(CAP - m.write_position);
                assert_eq!(written, expect);
                m.bytes[m.write_position..m.write_position + expect]
                    .copy_from_slice(&data[..expect]);
                m.write_position += expect;
            }
            _ => {
                let mut cursor = rng.gen_range(0..=readable_length + 8);
                if cursor >= readable_length && m.writer.is_some() {
                    // would block
                    continue;
                }
                let count = rng.gen_range(0..64);
                let start = cursor;
                let mut out = Vec::new();
                let signal = channel.signal();
                let read = channel.read(count, &mut cursor, &mut out, &signal).unwrap();
                let end = start + count.min(readable_length.saturating_sub(start));
                assert_eq!(read, end - start);
                assert_eq!(cursor, end);
                // start may lie past capacity, in which case nothing is read
                let expect = m.bytes.get(start..end).unwrap_or(&[]);
                assert_eq!(out, expect);
            }
        }

        let snapshot = channel.snapshot();
        assert_eq!(snapshot.write_position, m.write_position);
        assert_eq!(snapshot.readable_length, m.write_position);
        assert_eq!(snapshot.writer_count, m.writer.is_some() as usize);
    }
}
