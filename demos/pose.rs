use anyhow::{Context, Result};
use log::*;
use mocap::*;
use structopt::StructOpt;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Debug, StructOpt)]
#[structopt(name = "pose", about = "prints bone end points of an ASF skeleton, optionally posed by an AMC motion")]
struct Opt {
    /// Skeleton file
    #[structopt(parse(from_os_str))]
    asf: PathBuf,

    /// Motion file
    #[structopt(parse(from_os_str))]
    amc: Option<PathBuf>,

    /// Frame to evaluate, clamped to the motion's frames
    #[structopt(short, long)]
    frame: Option<i64>,

    /// Evaluate every frame instead of a single one
    #[structopt(short, long)]
    all_frames: bool,
}

fn print_pose(skeleton: &Skeleton, pose: &Pose) {
    for (index, _) in pose.iter() {
        let bone = &skeleton.bones()[index];
        let (start, tip) = match (pose.bone_start(index), pose.bone_tip(skeleton, index)) {
            (Some(start), Some(tip)) => (start, tip),
            _ => continue,
        };
        println!(
            "{:>3} {:<16} ({:8.3} {:8.3} {:8.3}) -> ({:8.3} {:8.3} {:8.3})",
            bone.id, bone.name, start.x, start.y, start.z, tip.x, tip.y, tip.z
        );
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let opt = Opt::from_args();
    let file = File::open(&opt.asf).context("failed to open asf")?;
    let skeleton = Skeleton::parse(BufReader::new(file)).context("failed to read asf")?;
    info!("{} bones", skeleton.bones().len());

    let amc = match opt.amc {
        Some(ref amc) => amc,
        None => {
            print_pose(&skeleton, &skeleton.rest_pose());
            return Ok(());
        }
    };

    let file = File::open(amc).context("failed to open amc")?;
    let motion = Motion::parse(BufReader::new(file), &skeleton).context("failed to read amc")?;
    info!(
        "{} frames starting at {}",
        motion.frame_count(),
        motion.first_frame()
    );

    if opt.all_frames {
        for frame in motion.frame_range() {
            println!("frame {}", frame);
            print_pose(&skeleton, &motion.pose(&skeleton, frame as i64)?);
        }
        return Ok(());
    }

    let frame = motion
        .clamp_frame(opt.frame.unwrap_or(0))
        .context("motion has no frames")?;
    println!("frame {}", frame);
    print_pose(&skeleton, &motion.pose(&skeleton, frame as i64)?);
    Ok(())
}
