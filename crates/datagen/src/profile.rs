//! Per-channel sampling ranges. Email runs small budgets with strong
//! engagement; paid ads buy broad reach at lower rates.

use campaign_core::Channel;
use std::ops::RangeInclusive;

#[derive(Debug, Clone)]
pub struct ChannelProfile {
    pub channel: Channel,
    /// Budget in BRL.
    pub budget: RangeInclusive<f64>,
    /// Impressions bought per BRL spent.
    pub impressions_per_brl: RangeInclusive<f64>,
    pub ctr: RangeInclusive<f64>,
    pub conversion_rate: RangeInclusive<f64>,
    pub ad_groups: &'static [&'static str],
}

impl ChannelProfile {
    pub fn for_channel(channel: Channel) -> Self {
        match channel {
            Channel::Email => Self {
                channel,
                budget: 400.0..=900.0,
                impressions_per_brl: 150.0..=250.0,
                ctr: 0.035..=0.06,
                conversion_rate: 0.05..=0.08,
                ad_groups: &[
                    "Boas_Vindas",
                    "Aniversariantes",
                    "Carrinho_Abandonado",
                    "Newsletter_Promocional",
                ],
            },
            Channel::SocialMedia => Self {
                channel,
                budget: 1000.0..=3000.0,
                impressions_per_brl: 200.0..=300.0,
                ctr: 0.025..=0.045,
                conversion_rate: 0.02..=0.035,
                ad_groups: &[
                    "Stories_Promocao",
                    "Influencer_Parceria",
                    "Feed_Novidades",
                    "Live_Shopping",
                ],
            },
            Channel::PaidAds => Self {
                channel,
                budget: 3500.0..=8000.0,
                impressions_per_brl: 250.0..=350.0,
                ctr: 0.015..=0.03,
                conversion_rate: 0.018..=0.025,
                ad_groups: &[
                    "Video_Reels",
                    "Search_Marca",
                    "Display_Retargeting",
                    "Shopping_Ads",
                ],
            },
        }
    }
}
