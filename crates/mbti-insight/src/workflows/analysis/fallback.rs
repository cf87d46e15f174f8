use async_trait::async_trait;

use super::error::AnalysisError;
use super::pipeline::AnalysisOrigin;
use super::provider::{AnalysisProvider, GeneratedAnalysis};
use super::request::AnalysisRequest;

pub const REJECTION_TEXT: &str = "无法生成分析结果，请重新测试。";
pub const UNAVAILABLE_NOTICE: &str = "AI分析服务暂时不可用";

const CANNED_ANALYSES: [(&str, &str); 16] = [
    ("INTJ", "根据你的MBTI类型INTJ，AI分析显示你是一个具有战略思维的人。你善于规划长远目标，逻辑思维强，喜欢独立工作。你倾向于追求完美，对自己和他人都有较高的标准。"),
    ("INTP", "根据你的MBTI类型INTP，AI分析显示你是一个富有创造力和好奇心的人。你喜欢探索新想法和概念，善于分析复杂问题。你享受独处的时间，通过思考来理解世界。"),
    ("ENTJ", "根据你的MBTI类型ENTJ，AI分析显示你是一个天生的领导者。你具有强烈的组织能力和决策能力，善于制定计划并执行。你喜欢挑战，总是寻求改进和效率。"),
    ("ENTP", "根据你的MBTI类型ENTP，AI分析显示你是一个充满创新思维的人。你喜欢头脑风暴和探索各种可能性，善于从不同角度看待问题。你适应性强，喜欢变化和多样性。"),
    ("INFJ", "根据你的MBTI类型INFJ，AI分析显示你是一个富有洞察力和同情心的人。你善于理解他人的情感和需求，具有强烈的价值观。你追求意义和目标，希望为世界带来积极影响。"),
    ("INFP", "根据你的MBTI类型INFP，AI分析显示你是一个理想主义者和价值驱动的人。你重视真实性和个人成长，具有强烈的道德感。你富有创造力，通过艺术或写作来表达自己。"),
    ("ENFJ", "根据你的MBTI类型ENFJ，AI分析显示你是一个富有魅力和同情心的人。你善于理解和支持他人，具有强烈的责任感。你享受帮助他人成长和发展，是天生的导师。"),
    ("ENFP", "根据你的MBTI类型ENFP，AI分析显示你是一个充满热情和创造力的人。你善于发现新的可能性，喜欢与他人分享想法。你适应性强，总是寻求新的体验和冒险。"),
    ("ISTJ", "根据你的MBTI类型ISTJ，AI分析显示你是一个可靠和负责任的人。你重视传统和秩序，喜欢按照既定的规则和程序工作。你注重细节，是团队中的稳定力量。"),
    ("ISFJ", "根据你的MBTI类型ISFJ，AI分析显示你是一个关怀支持和他人的人。你重视和谐和稳定，善于创造舒适的环境。你忠诚可靠，总是愿意帮助他人。"),
    ("ESTJ", "根据你的MBTI类型ESTJ，AI分析显示你是一个务实和高效的人。你善于组织和管理，喜欢制定清晰的计划和目标。你重视效率和结果，是优秀的执行者。"),
    ("ESFJ", "根据你的MBTI类型ESFJ，AI分析显示你是一个友好和合群的人。你重视人际关系和和谐，善于照顾他人的需求。你是团队中的粘合剂，总是寻求共识和合作。"),
    ("ISTP", "根据你的MBTI类型ISTP，AI分析显示你是一个实用和适应性强的人。你善于解决问题和处理危机，喜欢动手操作。你独立自主，喜欢按照自己的节奏工作。"),
    ("ISFP", "根据你的MBTI类型ISFP，AI分析显示你是一个温和和艺术性的人。你重视美感和和谐，喜欢通过创造性的方式表达自己。你灵活适应，享受当下的体验。"),
    ("ESTP", "根据你的MBTI类型ESTP，AI分析显示你是一个充满活力和冒险精神的人。你喜欢行动和刺激，善于抓住机会。你现实务实，总是寻求新的体验和挑战。"),
    ("ESFP", "根据你的MBTI类型ESFP，AI分析显示你是一个热情和乐观的人。你享受生活和与他人互动，善于创造愉快的氛围。你灵活适应，总是寻求乐趣和新的体验。"),
];

/// Canned paragraph for a type code. Codes outside the table get a generic paragraph that
/// quotes the code verbatim.
pub fn canned_analysis(code: &str) -> String {
    CANNED_ANALYSES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, text)| (*text).to_string())
        .unwrap_or_else(|| generic_analysis(code))
}

fn generic_analysis(code: &str) -> String {
    format!("根据你的MBTI类型{code}，AI分析显示你是一个独特而有趣的个体。每个人都自己独特的性格特征，这些特征共同构成了你独特的个性。继续探索和发展你的优势！")
}

/// Provider backed by the static table. Never fails, never touches the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedAnalysisProvider;

impl CannedAnalysisProvider {
    pub fn analysis_for(&self, request: &AnalysisRequest) -> String {
        canned_analysis(&request.personality_type.code())
    }
}

#[async_trait]
impl AnalysisProvider for CannedAnalysisProvider {
    fn name(&self) -> &'static str {
        "canned"
    }

    fn origin(&self) -> AnalysisOrigin {
        AnalysisOrigin::Fallback
    }

    async fn generate(&self, request: &AnalysisRequest) -> Result<GeneratedAnalysis, AnalysisError> {
        Ok(GeneratedAnalysis {
            text: self.analysis_for(request),
            model: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::analysis::request::AnalysisProfile;
    use crate::workflows::questionnaire::PersonalityType;

    #[test]
    fn every_type_has_its_own_paragraph() {
        for kind in PersonalityType::all() {
            let code = kind.code();
            let text = canned_analysis(&code);
            assert!(text.contains(&code), "{code} missing from its paragraph");
            assert_ne!(text, generic_analysis(&code), "{code} fell through to generic");
        }
    }

    #[test]
    fn unknown_codes_get_templated_paragraph() {
        let text = canned_analysis("XYZW");
        assert!(text.starts_with("根据你的MBTI类型XYZW，"));
        assert_eq!(text, generic_analysis("XYZW"));
    }

    #[test]
    fn lookup_is_exact_match() {
        assert_eq!(canned_analysis("intj"), generic_analysis("intj"));
    }

    #[tokio::test]
    async fn provider_serves_table_entry() {
        let kind: PersonalityType = "ISTJ".parse().expect("valid code");
        let request = AnalysisRequest::new(kind, "unused", AnalysisProfile::Detailed);

        let generated = CannedAnalysisProvider
            .generate(&request)
            .await
            .expect("canned provider never fails");

        assert_eq!(generated.text, canned_analysis("ISTJ"));
        assert!(generated.model.is_none());
    }
}
