// Audio output using cpal
// The device stream is fed through a ring buffer; the playback thread
// pushes interleaved f32 samples and the device callback drains them.
// Players go through the AudioSink trait so tests can run without a device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use hound::WavSpec;
use ringbuf::{
    traits::{Consumer, Producer, Split},
    HeapRb,
};

use super::AudioError;

type RingProducer = ringbuf::HeapProd<f32>;
type RingConsumer = ringbuf::HeapCons<f32>;

/// Destination for decoded samples. Implementations are created on the
/// playback thread and never leave it.
pub trait AudioSink {
    /// Write interleaved samples, blocking until all are accepted.
    fn write(&mut self, samples: &[f32]);
}

/// Opens one sink per audio source, sized to the source's channel count
/// and sample rate. The factory crosses into the playback thread; sinks
/// do not.
pub trait SinkFactory: Send {
    fn open(&self, spec: WavSpec) -> Result<Box<dyn AudioSink>, AudioError>;
}

pub struct CpalSink {
    _stream: Stream,
    producer: RingProducer,
}

impl CpalSink {
    /// Open the default output device configured to the source spec.
    /// The host and device are resolved fresh on every call, never cached.
    pub fn open(spec: WavSpec) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let sample_format = device.default_output_config()?.sample_format();

        let config = StreamConfig {
            channels: spec.channels,
            sample_rate: SampleRate(spec.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // ~250ms of audio at the source rate
        let capacity = (spec.sample_rate as usize * spec.channels as usize / 4).max(8192);
        let (producer, consumer) = HeapRb::<f32>::new(capacity).split();

        let stream = match sample_format {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, consumer)?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, consumer)?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, consumer)?,
            format => return Err(AudioError::UnsupportedFormat(format)),
        };

        stream.play()?;

        Ok(Self {
            _stream: stream,
            producer,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        mut consumer: RingConsumer,
    ) -> Result<Stream, AudioError> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Underruns play out as silence
                for sample in data.iter_mut() {
                    *sample = T::from_sample(consumer.try_pop().unwrap_or(0.0));
                }
            },
            move |err| {
                tracing::error!("audio output error: {err}");
            },
            None,
        )?;

        Ok(stream)
    }
}

impl AudioSink for CpalSink {
    fn write(&mut self, samples: &[f32]) {
        let mut remaining = samples;
        while !remaining.is_empty() {
            let pushed = self.producer.push_slice(remaining);
            if pushed > 0 {
                remaining = &remaining[pushed..];
            } else {
                // Buffer full, wait for the device to drain
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
    }
}

/// Default factory backed by the system audio device.
#[derive(Clone, Copy)]
pub struct CpalSinkFactory;

impl SinkFactory for CpalSinkFactory {
    fn open(&self, spec: WavSpec) -> Result<Box<dyn AudioSink>, AudioError> {
        Ok(Box::new(CpalSink::open(spec)?))
    }
}
