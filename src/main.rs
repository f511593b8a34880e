use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};

use anyhow::{Context, Result};
use clap::Parser;

use trajc::cli::args::{Cli, Format, Mode};
use trajc::cli::constants::{set_display_level, PROGRAM_NAME};
use trajc::core::CoreConfig;
use trajc::core::{Compressor, Decompressor};
use trajc::displaylevel;
use trajc::io::{
    BinaryReader, BinaryWriter, FileChunkSink, FileChunkSource, FrameReader, FrameWriter, SyntheticSource,
    TsvReader, TsvWriter,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    set_display_level(cli.verbose);

    let config = CoreConfig {
        num_traj: cli.num_traj,
        bound: cli.bound,
        error: cli.error,
        qp_ratio: cli.qp_ratio,
        chunk_size: cli.chunk_size,
        codec: cli.codec.into(),
    };
    config.validate().context("invalid configuration")?;

    match cli.mode {
        Mode::Compress => run_compress(&cli, &config),
        Mode::Decompress => run_decompress(&cli, &config),
    }
}

fn open_reader(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        Ok(Box::new(io::stdin()))
    } else {
        Ok(Box::new(File::open(path).with_context(|| format!("opening {path} for reading"))?))
    }
}

fn open_writer(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(File::create(path).with_context(|| format!("opening {path} for writing"))?))
    }
}

fn build_frame_reader(cli: &Cli, num_traj: usize) -> Result<Box<dyn FrameReader>> {
    Ok(match cli.format {
        Format::Binary => Box::new(BinaryReader::new(open_reader(&cli.src)?, num_traj, 0)),
        Format::Tsv => Box::new(TsvReader::new(BufReader::new(open_reader(&cli.src)?), num_traj)),
        Format::Synthetic => Box::new(SyntheticSource::new(num_traj, cli.synthetic_frames)),
    })
}

fn build_frame_writer(cli: &Cli, num_traj: usize) -> Result<Box<dyn FrameWriter>> {
    match cli.format {
        Format::Binary => Ok(Box::new(BinaryWriter::new(open_writer(&cli.dst)?, num_traj))),
        Format::Tsv => Ok(Box::new(TsvWriter::new(open_writer(&cli.dst)?))),
        Format::Synthetic => {
            anyhow::bail!("synthetic is a read-only source format and cannot be a decompression target")
        }
    }
}

fn run_compress(cli: &Cli, config: &CoreConfig) -> Result<()> {
    let num_traj = config.num_traj as usize;
    let block_size = if cli.block_size == 0 { usize::MAX } else { cli.block_size };

    let mut reader = build_frame_reader(cli, num_traj)?;
    let mut dst = BufWriter::new(open_writer(&cli.dst)?);

    let mut frame = vec![0.0; num_traj];
    let mut total_frames: u64 = 0;
    let mut blocks: u64 = 0;

    loop {
        let sink = FileChunkSink::new(&mut dst);
        let mut compressor = Compressor::new(config, sink)?;

        let mut frames_in_block = 0usize;
        while frames_in_block < block_size {
            if !reader.read_frame(&mut frame)? {
                break;
            }
            compressor.add_frame(&frame)?;
            frames_in_block += 1;
            total_frames += 1;
        }

        if frames_in_block == 0 {
            break;
        }
        compressor.finish()?;
        blocks += 1;
        displaylevel!(3, "{PROGRAM_NAME}: block {blocks} ({frames_in_block} frames)\n");

        if frames_in_block < block_size {
            break;
        }
    }

    dst.flush()?;
    displaylevel!(2, "{PROGRAM_NAME}: compressed {total_frames} frames in {blocks} blocks\n");
    Ok(())
}

fn run_decompress(cli: &Cli, config: &CoreConfig) -> Result<()> {
    let num_traj = config.num_traj as usize;
    let mut src = BufReader::new(open_reader(&cli.src)?);
    let mut writer = build_frame_writer(cli, num_traj)?;

    let mut frame = vec![0.0; num_traj];
    let mut total_frames: u64 = 0;
    let mut blocks: u64 = 0;

    loop {
        let source = FileChunkSource::new(&mut src);
        let mut decompressor = Decompressor::new(config, source)?;

        let mut frames_in_block = 0u64;
        while decompressor.read_frame(&mut frame)? {
            writer.write_frame(&frame)?;
            frames_in_block += 1;
            total_frames += 1;
        }

        if frames_in_block == 0 {
            break;
        }
        blocks += 1;
        displaylevel!(3, "{PROGRAM_NAME}: block {blocks} ({frames_in_block} frames)\n");
    }

    displaylevel!(2, "{PROGRAM_NAME}: decompressed {total_frames} frames in {blocks} blocks\n");
    Ok(())
}
