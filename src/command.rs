use crate::config::COMMAND_HEADER;

/// Audio output squeezelite should drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioOutput {
    #[default]
    I2s,
    Spdif,
    Bluetooth,
}

impl AudioOutput {
    pub const ALL: [AudioOutput; 3] = [AudioOutput::I2s, AudioOutput::Spdif, AudioOutput::Bluetooth];

    pub fn label(&self) -> &'static str {
        match self {
            AudioOutput::I2s => "I2S",
            AudioOutput::Spdif => "SPDIF",
            AudioOutput::Bluetooth => "Bluetooth",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            AudioOutput::I2s => AudioOutput::Spdif,
            AudioOutput::Spdif => AudioOutput::Bluetooth,
            AudioOutput::Bluetooth => AudioOutput::I2s,
        }
    }
}

/// Build the squeezelite command line stored as `autoexec1`.
///
/// `bt_sink` is only used for the Bluetooth output.
pub fn build_command(player: &str, output: AudioOutput, bt_sink: &str, optional: &str) -> String {
    let mut command = format!("{COMMAND_HEADER}-n {player}");

    match output {
        AudioOutput::Bluetooth => {
            command.push_str(&format!(" -o \"BT -n '{bt_sink}'\" -R -Z 192000"));
        }
        AudioOutput::Spdif => command.push_str(" -o SPDIF -R -Z 192000"),
        AudioOutput::I2s => command.push_str(" -o I2S"),
    }

    if !optional.is_empty() {
        command.push(' ');
        command.push_str(optional);
    }
    command
}
